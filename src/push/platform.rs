use crate::error::Result;
use crate::push::state::Permission;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A push registration: where to deliver and how to encrypt.
/// Serializes to the `{endpoint, keys}` body the backend expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// The push capability of the device the client runs on.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    /// Whether this device can receive pushes at all
    fn is_supported(&self) -> bool;

    /// Current permission, without prompting
    fn permission(&self) -> Permission;

    /// Ask the user for permission. Returns the resulting permission
    async fn request_permission(&self) -> Result<Permission>;

    /// Resolves once the service worker is active
    async fn ready(&self) -> Result<()>;

    async fn get_subscription(&self) -> Result<Option<PushSubscription>>;

    /// Create a subscription bound to the server's VAPID public key
    async fn subscribe(&self, application_server_key: &str) -> Result<PushSubscription>;

    /// Remove the subscription. Returns false if there was nothing to remove
    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool>;
}
