use crate::api::ApiClient;
use crate::chat::stream::ChatStream;
use crate::config::Config;
use crate::error::{JournalError, Result};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tokio::time::{timeout, Duration};

pub const STREAM_PATH: &str = "/chat/stream";
pub const TOOL_CONFIRM_PATH: &str = "/chat/tool-confirm";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<&'a str>,
    pub enable_tools: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolConfirmRequest<'a> {
    tool_call_id: &'a str,
    confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
}

/// What the server reported after confirming or discarding an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub message: Option<String>,
}

/// Client for the streaming chat endpoints.
#[derive(Clone)]
pub struct ChatClient {
    api: ApiClient,
    stream_timeout: Duration,
}

impl ChatClient {
    pub fn new(api: ApiClient, stream_timeout: Duration) -> Self {
        Self {
            api,
            stream_timeout,
        }
    }

    pub fn from_config(api: ApiClient, config: &Config) -> Self {
        Self::new(api, Duration::from_secs(config.stream_timeout))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Open a streaming assistant turn.
    ///
    /// Fails on network errors, a non-success status or when the response
    /// headers take longer than the stream timeout; once the stream is open,
    /// errors arrive through [`ChatStream::next_event`].
    pub async fn stream_message(
        &self,
        text: &str,
        conversation_id: Option<&str>,
        system_prompt: Option<&str>,
        enable_tools: bool,
    ) -> Result<ChatStream> {
        let body = StreamRequest {
            message: text,
            conversation_id,
            system_prompt,
            enable_tools,
        };
        let builder = self
            .api
            .request(Method::POST, STREAM_PATH)?
            .header(ACCEPT, "text/event-stream")
            .json(&body);
        let response = timeout(self.stream_timeout, self.api.send(STREAM_PATH, builder))
            .await
            .map_err(|_| JournalError::Timeout)??;
        Ok(ChatStream::from_response(response, self.stream_timeout))
    }

    /// Execute (`confirmed = true`) or discard a pending tool call server-side.
    pub async fn confirm_tool_execution(
        &self,
        tool_call_id: &str,
        confirmed: bool,
        conversation_id: Option<&str>,
    ) -> Result<ToolExecutionResult> {
        let body = ToolConfirmRequest {
            tool_call_id,
            confirmed,
            conversation_id,
        };
        let builder = self
            .api
            .request(Method::POST, TOOL_CONFIRM_PATH)?
            .json(&body);
        let (status, envelope) = self.api.send_envelope(TOOL_CONFIRM_PATH, builder).await?;
        let message = envelope.message.clone();
        let _: Value = envelope.into_data(status)?;
        Ok(ToolExecutionResult { message })
    }
}
