use serde::{Deserialize, Serialize};
use std::fmt;

/// Notification permission. Moves from `Default` to `Granted` or `Denied`
/// once and is never reset by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    #[default]
    Default,
    Granted,
    Denied,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::Default => "default",
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        };
        write!(f, "{}", name)
    }
}

/// Snapshot of the push subscription as the client sees it. Rebuilt from
/// the platform on every load; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscriptionState {
    pub is_supported: bool,
    pub is_subscribed: bool,
    pub is_loading: bool,
    pub permission: Permission,
    pub error: Option<String>,
}
