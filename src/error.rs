use std::fmt;

#[derive(Debug)]
pub enum JournalError {
    ApiError {
        status: u16,
        message: String,
    },
    /// The backend rejected the stored credentials. They have been cleared.
    Unauthorized,
    ConfigError(String),
    AuthError(String),
    PushUnsupported,
    PermissionDenied,
    /// The permission prompt was dismissed or could not be shown.
    PermissionNotGranted,
    ServiceWorkerTimeout(u64),
    VapidKeyUnavailable,
    PushError(String),
    /// A tool call is still waiting for confirmation.
    ToolCallPending(String),
    StreamError(String),
    NetworkError(reqwest::Error),
    Timeout,
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            JournalError::Unauthorized => {
                write!(f, "Session expired or invalid. Please log in again")
            }
            JournalError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            JournalError::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            JournalError::PushUnsupported => {
                write!(f, "Push notifications are not supported on this device")
            }
            JournalError::PermissionDenied => write!(
                f,
                "Notification permission denied. Enable notifications in your settings"
            ),
            JournalError::PermissionNotGranted => write!(
                f,
                "Notification permission was not granted. Run the command again in a terminal to answer the prompt"
            ),
            JournalError::ServiceWorkerTimeout(secs) => {
                write!(f, "Service worker not ready after {} seconds", secs)
            }
            JournalError::VapidKeyUnavailable => {
                write!(f, "Push notifications are not configured on the server")
            }
            JournalError::PushError(msg) => write!(f, "Push error: {}", msg),
            JournalError::ToolCallPending(name) => {
                write!(f, "Confirm or cancel the pending action '{}' first", name)
            }
            JournalError::StreamError(msg) => write!(f, "Stream error: {}", msg),
            JournalError::NetworkError(e) => write!(f, "Network error: {}", e),
            JournalError::Timeout => write!(f, "Request timeout"),
            JournalError::IoError(e) => write!(f, "IO error: {}", e),
            JournalError::JsonError(e) => write!(f, "JSON error: {}", e),
            JournalError::YamlError(e) => write!(f, "YAML error: {}", e),
            JournalError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for JournalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            JournalError::NetworkError(e) => Some(e),
            JournalError::IoError(e) => Some(e),
            JournalError::JsonError(e) => Some(e),
            JournalError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for JournalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JournalError::Timeout
        } else {
            JournalError::NetworkError(err)
        }
    }
}

impl From<std::io::Error> for JournalError {
    fn from(err: std::io::Error) -> Self {
        JournalError::IoError(err)
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(err: serde_json::Error) -> Self {
        JournalError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for JournalError {
    fn from(err: serde_yaml::Error) -> Self {
        JournalError::YamlError(err)
    }
}

impl From<anyhow::Error> for JournalError {
    fn from(err: anyhow::Error) -> Self {
        JournalError::Other(err.to_string())
    }
}

impl From<String> for JournalError {
    fn from(msg: String) -> Self {
        JournalError::Other(msg)
    }
}

impl From<&str> for JournalError {
    fn from(msg: &str) -> Self {
        JournalError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;
