use crate::api::ApiClient;
use crate::error::{JournalError, Result};
use crate::push::platform::{PushPlatform, PushSubscription};
use crate::push::state::{Permission, PushSubscriptionState};
use colored::*;
use std::sync::Arc;
use tokio::time::{sleep, timeout, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    /// How long to wait for the service worker before giving up.
    pub ready_timeout: Duration,
    /// Delay before the one retry of the VAPID key fetch.
    pub vapid_retry_delay: Duration,
}

impl Default for PushSettings {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(10),
            vapid_retry_delay: Duration::from_secs(2),
        }
    }
}

/// Keeps the device's push subscription and the backend in step.
pub struct PushSubscriptionManager {
    platform: Arc<dyn PushPlatform>,
    api: ApiClient,
    settings: PushSettings,
    state: PushSubscriptionState,
    vapid_public_key: Option<String>,
}

impl PushSubscriptionManager {
    pub fn new(platform: Arc<dyn PushPlatform>, api: ApiClient, settings: PushSettings) -> Self {
        let state = PushSubscriptionState {
            is_supported: platform.is_supported(),
            permission: platform.permission(),
            ..Default::default()
        };
        Self {
            platform,
            api,
            settings,
            state,
            vapid_public_key: None,
        }
    }

    pub fn state(&self) -> &PushSubscriptionState {
        &self.state
    }

    pub fn vapid_public_key(&self) -> Option<&str> {
        self.vapid_public_key.as_deref()
    }

    fn log(&self, message: &str) {
        if self.api.verbose() {
            eprintln!("{}", format!("[push] {}", message).dimmed());
        }
    }

    /// Probe the device, fetch the VAPID key and re-derive the subscription.
    pub async fn init(&mut self) -> &PushSubscriptionState {
        self.state.is_supported = self.platform.is_supported();
        self.state.permission = self.platform.permission();
        if self.state.is_supported {
            self.load_vapid_key().await;
            self.check_subscription().await;
        }
        &self.state
    }

    /// Fetch the VAPID key, retrying once. A second failure is not an error:
    /// the key stays unset and subscribing reports it.
    pub async fn load_vapid_key(&mut self) -> Option<&str> {
        match self.api.push_public_key().await {
            Ok(key) => self.vapid_public_key = Some(key),
            Err(e) => {
                self.log(&format!(
                    "VAPID key fetch failed ({}), retrying in {:?}",
                    e, self.settings.vapid_retry_delay
                ));
                sleep(self.settings.vapid_retry_delay).await;
                match self.api.push_public_key().await {
                    Ok(key) => self.vapid_public_key = Some(key),
                    Err(e) => self.log(&format!("VAPID key unavailable: {}", e)),
                }
            }
        }
        self.vapid_public_key.as_deref()
    }

    async fn wait_ready(&self) -> Result<()> {
        match timeout(self.settings.ready_timeout, self.platform.ready()).await {
            Ok(ready) => ready,
            Err(_) => Err(JournalError::ServiceWorkerTimeout(
                self.settings.ready_timeout.as_secs(),
            )),
        }
    }

    /// Re-derive `is_subscribed` from the platform.
    pub async fn check_subscription(&mut self) -> bool {
        if !self.state.is_supported {
            self.state.is_subscribed = false;
            return false;
        }

        let found = async {
            self.wait_ready().await?;
            self.platform.get_subscription().await
        }
        .await;

        self.state.is_subscribed = match found {
            Ok(subscription) => subscription.is_some(),
            Err(e) => {
                self.log(&format!("could not read subscription: {}", e));
                false
            }
        };
        self.state.is_subscribed
    }

    /// Subscribe this device. Returns `true` only when both the platform and
    /// the backend hold the new subscription; otherwise `error` is set.
    pub async fn subscribe(&mut self) -> bool {
        self.state.error = None;
        self.state.permission = self.platform.permission();

        let precondition = if !self.state.is_supported {
            Some(JournalError::PushUnsupported)
        } else if self.state.permission == Permission::Denied {
            Some(JournalError::PermissionDenied)
        } else if self.vapid_public_key.is_none() {
            Some(JournalError::VapidKeyUnavailable)
        } else {
            None
        };
        if let Some(e) = precondition {
            return self.fail(e);
        }

        self.state.is_loading = true;
        let result = self.try_subscribe().await;
        self.state.is_loading = false;

        match result {
            Ok(()) => {
                self.state.is_subscribed = true;
                self.log("subscribed");
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn try_subscribe(&mut self) -> Result<()> {
        let key = self
            .vapid_public_key
            .clone()
            .ok_or(JournalError::VapidKeyUnavailable)?;

        let permission = self.platform.request_permission().await?;
        self.state.permission = permission;
        match permission {
            Permission::Granted => {}
            Permission::Denied => return Err(JournalError::PermissionDenied),
            Permission::Default => return Err(JournalError::PermissionNotGranted),
        }

        self.wait_ready().await?;

        if let Some(existing) = self.platform.get_subscription().await? {
            self.log("removing previous subscription");
            self.platform.unsubscribe(&existing).await?;
            self.state.is_subscribed = false;
        }

        let subscription = self.platform.subscribe(&key).await?;
        if let Err(e) = self.api.push_subscribe(&subscription).await {
            // Don't leave a registration the backend never heard of
            if let Err(cleanup) = self.platform.unsubscribe(&subscription).await {
                self.log(&format!("could not remove subscription: {}", cleanup));
            }
            return Err(e);
        }
        Ok(())
    }

    /// Unsubscribe this device. The backend is told first, so a failure
    /// there leaves both sides still subscribed.
    pub async fn unsubscribe(&mut self) -> bool {
        self.state.error = None;
        if !self.state.is_supported {
            return self.fail(JournalError::PushUnsupported);
        }

        self.state.is_loading = true;
        let result = self.try_unsubscribe().await;
        self.state.is_loading = false;

        match result {
            Ok(()) => {
                self.state.is_subscribed = false;
                self.log("unsubscribed");
                true
            }
            Err(e) => self.fail(e),
        }
    }

    async fn try_unsubscribe(&mut self) -> Result<()> {
        self.wait_ready().await?;
        let subscription = match self.platform.get_subscription().await? {
            Some(subscription) => subscription,
            None => return Ok(()),
        };

        self.api.push_unsubscribe(&subscription.endpoint).await?;
        self.platform.unsubscribe(&subscription).await?;
        Ok(())
    }

    /// Ask the backend to deliver a test notification.
    pub async fn send_test(&mut self) -> bool {
        self.state.error = None;
        if !self.state.is_subscribed {
            return self.fail(JournalError::PushError(
                "Subscribe to notifications first".to_string(),
            ));
        }
        match self.api.push_send_test().await {
            Ok(()) => true,
            Err(e) => self.fail(e),
        }
    }

    /// The platform replaced a subscription on its own; register the new
    /// one with the backend.
    pub async fn renew(&mut self, subscription: &PushSubscription) -> Result<()> {
        self.api.push_subscribe(subscription).await?;
        self.state.is_subscribed = true;
        Ok(())
    }

    fn fail(&mut self, error: JournalError) -> bool {
        self.log(&format!("failed: {}", error));
        self.state.error = Some(error.to_string());
        false
    }
}
