use crate::error::{JournalError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response wrapper used by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Human-readable failure text: `error`, then `message`, then a fallback.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Request failed".to_string())
    }
}

impl ApiResponse<Value> {
    /// Convert a successful envelope into its typed payload.
    /// A missing `data` field decodes as JSON null, so `()` and `Option<_>` work.
    pub fn into_data<T: DeserializeOwned>(self, status: u16) -> Result<T> {
        if !self.success {
            return Err(JournalError::ApiError {
                status,
                message: self.failure_message(),
            });
        }
        let data = self.data.unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }
}

/// Extract the error text from a failed response body, which may or may not
/// be an envelope.
pub fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiResponse<Value>>(body) {
        if envelope.error.is_some() || envelope.message.is_some() {
            return envelope.failure_message();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        trimmed.to_string()
    }
}
