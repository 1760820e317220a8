use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PushConfig {
    /// Seconds to wait for the service worker to become active.
    #[serde(default)]
    pub ready_timeout_secs: Option<u64>,
    /// Delay before the single retry of the VAPID key fetch.
    #[serde(default)]
    pub vapid_retry_delay_ms: Option<u64>,
    /// Base URL of the relay that delivers pushes to this device.
    /// Without it the device reports push as unsupported.
    #[serde(default)]
    pub relay_url: Option<String>,
}
