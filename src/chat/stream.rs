use crate::error::{JournalError, Result};
use crate::models::ToolCallData;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;
use tokio::time::{timeout, Duration};

/// Terminator line sent by the server after the last event.
pub const DONE_SENTINEL: &str = "[DONE]";

/// One decoded event of an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// A piece of assistant text, in arrival order.
    Content(String),
    /// The assistant proposes an action that needs confirmation.
    ToolCall(ToolCallData),
    /// The server assigned (or confirmed) the conversation id.
    Conversation(String),
    Done,
}

/// Parse a single stream line.
///
/// Returns `None` for lines that carry nothing: blanks, comments, fields
/// other than `data`, and malformed JSON. A server-side error payload is
/// returned as `Some(Err(_))`.
pub fn parse_line(line: &str) -> Option<Result<ChatEvent>> {
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let colon_pos = line.find(':')?;
    let field = line[..colon_pos].trim();
    if field != "data" {
        return None;
    }
    let value = line[colon_pos + 1..].trim();

    if value == DONE_SENTINEL {
        return Some(Ok(ChatEvent::Done));
    }

    let payload: Value = serde_json::from_str(value).ok()?;
    parse_payload(&payload)
}

fn parse_payload(payload: &Value) -> Option<Result<ChatEvent>> {
    let kind = payload.get("type").and_then(|t| t.as_str());

    match kind {
        Some("content") | None => {
            if kind.is_none() {
                if let Some(error) = payload.get("error").and_then(|e| e.as_str()) {
                    return Some(Err(JournalError::StreamError(error.to_string())));
                }
            }
            let content = payload.get("content")?.as_str()?;
            if content.is_empty() {
                return None;
            }
            Some(Ok(ChatEvent::Content(content.to_string())))
        }
        Some("tool_call") | Some("toolCall") | Some("tool_confirmation") => {
            let source = payload
                .get("toolCall")
                .or_else(|| payload.get("data"))
                .unwrap_or(payload);
            let mut tool_call: ToolCallData = serde_json::from_value(source.clone()).ok()?;
            if tool_call.conversation_id.is_none() {
                tool_call.conversation_id = payload
                    .get("conversationId")
                    .and_then(|c| c.as_str())
                    .map(str::to_string);
            }
            Some(Ok(ChatEvent::ToolCall(tool_call)))
        }
        Some("conversation") => payload
            .get("conversationId")
            .and_then(|c| c.as_str())
            .map(|id| Ok(ChatEvent::Conversation(id.to_string()))),
        Some("error") => {
            let message = payload
                .get("error")
                .or_else(|| payload.get("message"))
                .and_then(|e| e.as_str())
                .unwrap_or("The assistant failed to respond");
            Some(Err(JournalError::StreamError(message.to_string())))
        }
        Some("done") => Some(Ok(ChatEvent::Done)),
        Some(_) => None,
    }
}

/// Splits an incoming byte stream into lines and decodes them.
///
/// Bytes are buffered until a newline arrives, so a line (or a multi-byte
/// character) split across network chunks is decoded once, whole.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    incomplete: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<Result<ChatEvent>> {
        self.incomplete.extend_from_slice(chunk);

        let last_newline = match self.incomplete.iter().rposition(|&b| b == b'\n') {
            Some(pos) => pos,
            None => return Vec::new(),
        };

        let complete: Vec<u8> = self.incomplete.drain(..=last_newline).collect();
        String::from_utf8_lossy(&complete)
            .split('\n')
            .filter_map(parse_line)
            .collect()
    }

    /// Decode whatever is left after the byte stream ended.
    pub fn finish(&mut self) -> Vec<Result<ChatEvent>> {
        if self.incomplete.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.incomplete);
        parse_line(&String::from_utf8_lossy(&rest))
            .into_iter()
            .collect()
    }
}

/// Lazy, finite sequence of events for one assistant turn.
///
/// Ends after `Done` or the first error; it cannot be restarted.
pub struct ChatStream {
    bytes: BoxStream<'static, Result<Bytes>>,
    decoder: StreamDecoder,
    pending: VecDeque<Result<ChatEvent>>,
    chunk_timeout: Duration,
    finished: bool,
}

/// Everything a finished turn produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamOutcome {
    pub content: String,
    pub tool_call: Option<ToolCallData>,
    pub conversation_id: Option<String>,
}

impl ChatStream {
    pub fn from_response(response: reqwest::Response, chunk_timeout: Duration) -> Self {
        Self::from_byte_stream(response.bytes_stream(), chunk_timeout)
    }

    pub fn from_byte_stream<S, E>(stream: S, chunk_timeout: Duration) -> Self
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: Into<JournalError> + 'static,
    {
        Self {
            bytes: stream.map(|chunk| chunk.map_err(Into::into)).boxed(),
            decoder: StreamDecoder::new(),
            pending: VecDeque::new(),
            chunk_timeout,
            finished: false,
        }
    }

    pub async fn next_event(&mut self) -> Option<Result<ChatEvent>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                if matches!(item, Ok(ChatEvent::Done) | Err(_)) {
                    self.finished = true;
                    self.pending.clear();
                }
                return Some(item);
            }

            if self.finished {
                return None;
            }

            match timeout(self.chunk_timeout, self.bytes.next()).await {
                Ok(Some(Ok(chunk))) => {
                    self.pending.extend(self.decoder.push(&chunk));
                }
                Ok(Some(Err(e))) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Ok(None) => {
                    // Stream closed without the sentinel
                    self.pending.extend(self.decoder.finish());
                    self.pending.push_back(Ok(ChatEvent::Done));
                }
                Err(_) => {
                    self.finished = true;
                    return Some(Err(JournalError::Timeout));
                }
            }
        }
    }

    /// Drain the stream, accumulating content in arrival order.
    pub async fn collect(mut self) -> Result<StreamOutcome> {
        let mut outcome = StreamOutcome::default();
        while let Some(event) = self.next_event().await {
            match event? {
                ChatEvent::Content(text) => outcome.content.push_str(&text),
                ChatEvent::ToolCall(tool_call) => {
                    if outcome.tool_call.is_none() {
                        outcome.tool_call = Some(tool_call);
                    }
                }
                ChatEvent::Conversation(id) => outcome.conversation_id = Some(id),
                ChatEvent::Done => break,
            }
        }
        Ok(outcome)
    }
}
