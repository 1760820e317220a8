mod common;

use async_trait::async_trait;
use common::{logged_in_backend, TestBackend};
use journal_client::error::{JournalError, Result};
use journal_client::push::{
    Permission, PushPlatform, PushSettings, PushSubscription, PushSubscriptionManager,
    SubscriptionKeys,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const VAPID_KEY: &str = "BExampleVapidKey";

/// In-memory platform that records every call.
struct FakePlatform {
    supported: bool,
    ready: bool,
    permission: Mutex<Permission>,
    prompt_answer: Permission,
    subscription: Mutex<Option<PushSubscription>>,
    calls: Mutex<Vec<String>>,
    created: Mutex<u32>,
}

impl FakePlatform {
    fn new(permission: Permission) -> Self {
        Self {
            supported: true,
            ready: true,
            permission: Mutex::new(permission),
            prompt_answer: Permission::Granted,
            subscription: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(0),
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn current(&self) -> Option<PushSubscription> {
        self.subscription.lock().unwrap().clone()
    }
}

fn subscription(endpoint: &str) -> PushSubscription {
    PushSubscription {
        endpoint: endpoint.to_string(),
        keys: SubscriptionKeys {
            p256dh: "p256dh-key".to_string(),
            auth: "auth-secret".to_string(),
        },
    }
}

#[async_trait]
impl PushPlatform for FakePlatform {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> Result<Permission> {
        self.record("request_permission");
        let mut permission = self.permission.lock().unwrap();
        if *permission == Permission::Default {
            *permission = self.prompt_answer;
        }
        Ok(*permission)
    }

    async fn ready(&self) -> Result<()> {
        self.record("ready");
        if self.ready {
            Ok(())
        } else {
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    async fn get_subscription(&self) -> Result<Option<PushSubscription>> {
        self.record("get_subscription");
        Ok(self.current())
    }

    async fn subscribe(&self, application_server_key: &str) -> Result<PushSubscription> {
        self.record(&format!("subscribe:{}", application_server_key));
        let mut created = self.created.lock().unwrap();
        *created += 1;
        let sub = subscription(&format!("https://push.example.com/sub/{}", created));
        *self.subscription.lock().unwrap() = Some(sub.clone());
        Ok(sub)
    }

    async fn unsubscribe(&self, subscription: &PushSubscription) -> Result<bool> {
        self.record(&format!("unsubscribe:{}", subscription.endpoint));
        let mut current = self.subscription.lock().unwrap();
        if current.as_ref() == Some(subscription) {
            *current = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn settings() -> PushSettings {
    PushSettings {
        ready_timeout: Duration::from_millis(50),
        vapid_retry_delay: Duration::from_millis(10),
    }
}

async fn mount_vapid_key(backend: &TestBackend) {
    Mock::given(method("GET"))
        .and(path("/api/v1/push/public-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "publicKey": VAPID_KEY }
        })))
        .mount(&backend.server)
        .await;
}

async fn mount_subscribe(backend: &TestBackend, status: u16) {
    let body = if status == 200 {
        json!({ "success": true, "message": "Subscribed" })
    } else {
        json!({ "success": false, "error": "Could not store subscription" })
    };
    Mock::given(method("POST"))
        .and(path("/api/v1/push/subscribe"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&backend.server)
        .await;
}

async fn manager_with(
    backend: &TestBackend,
    platform: Arc<FakePlatform>,
) -> PushSubscriptionManager {
    let mut manager = PushSubscriptionManager::new(platform, backend.api.clone(), settings());
    manager.init().await;
    manager
}

#[tokio::test]
async fn test_subscribe_registers_with_platform_and_backend() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/push/subscribe"))
        .and(body_partial_json(json!({
            "endpoint": "https://push.example.com/sub/1",
            "keys": { "p256dh": "p256dh-key", "auth": "auth-secret" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Default));
    let mut manager = manager_with(&backend, platform.clone()).await;
    assert_eq!(manager.vapid_public_key(), Some(VAPID_KEY));
    assert!(!manager.state().is_subscribed);

    assert!(manager.subscribe().await);

    let state = manager.state();
    assert!(state.is_subscribed);
    assert!(!state.is_loading);
    assert_eq!(state.permission, Permission::Granted);
    assert!(state.error.is_none());
    assert!(platform.calls().contains(&format!("subscribe:{}", VAPID_KEY)));
}

#[tokio::test]
async fn test_subscribe_replaces_existing_subscription() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    mount_subscribe(&backend, 200).await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    *platform.subscription.lock().unwrap() = Some(subscription("https://push.example.com/old"));

    let mut manager = manager_with(&backend, platform.clone()).await;
    assert!(manager.state().is_subscribed);
    assert!(manager.subscribe().await);

    let calls = platform.calls();
    let removed = calls
        .iter()
        .position(|c| c == "unsubscribe:https://push.example.com/old")
        .expect("old subscription removed");
    let created = calls
        .iter()
        .position(|c| c.starts_with("subscribe:"))
        .expect("new subscription created");
    assert!(removed < created);
    assert_eq!(
        platform.current().unwrap().endpoint,
        "https://push.example.com/sub/1"
    );
}

#[tokio::test]
async fn test_denied_permission_fails_before_platform_calls() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;

    let platform = Arc::new(FakePlatform::new(Permission::Denied));
    let mut manager = manager_with(&backend, platform.clone()).await;
    let calls_after_init = platform.calls().len();

    assert!(!manager.subscribe().await);

    let state = manager.state();
    assert!(!state.is_subscribed);
    assert_eq!(state.error, Some(JournalError::PermissionDenied.to_string()));
    assert_eq!(platform.calls().len(), calls_after_init);
}

#[tokio::test]
async fn test_unsupported_platform_reports_error() {
    let backend = logged_in_backend().await;
    let mut platform = FakePlatform::new(Permission::Default);
    platform.supported = false;
    let platform = Arc::new(platform);

    let mut manager = manager_with(&backend, platform.clone()).await;
    assert!(!manager.state().is_supported);
    assert!(!manager.subscribe().await);
    assert_eq!(
        manager.state().error,
        Some(JournalError::PushUnsupported.to_string())
    );
    assert!(platform.calls().is_empty());
    assert!(backend.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vapid_key_fetch_retries_once_then_gives_up() {
    let backend = logged_in_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/push/public-key"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "VAPID not configured"
        })))
        .expect(2)
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    let mut manager = manager_with(&backend, platform.clone()).await;

    assert!(manager.vapid_public_key().is_none());
    assert!(manager.state().error.is_none());

    assert!(!manager.subscribe().await);
    assert_eq!(
        manager.state().error,
        Some(JournalError::VapidKeyUnavailable.to_string())
    );
    assert!(!platform.calls().iter().any(|c| c.starts_with("subscribe:")));
}

#[tokio::test]
async fn test_vapid_key_retry_succeeds() {
    let backend = logged_in_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/push/public-key"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&backend.server)
        .await;
    mount_vapid_key(&backend).await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    let manager = manager_with(&backend, platform).await;
    assert_eq!(manager.vapid_public_key(), Some(VAPID_KEY));
}

#[tokio::test]
async fn test_backend_failure_removes_new_platform_subscription() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    mount_subscribe(&backend, 500).await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    let mut manager = manager_with(&backend, platform.clone()).await;

    assert!(!manager.subscribe().await);
    let state = manager.state();
    assert!(!state.is_subscribed);
    assert!(!state.is_loading);
    assert!(state
        .error
        .as_deref()
        .unwrap()
        .contains("Could not store subscription"));
    assert!(platform.current().is_none());
}

#[tokio::test]
async fn test_unsubscribe_tells_backend_before_platform() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/push/unsubscribe"))
        .and(body_partial_json(json!({ "endpoint": "https://push.example.com/mine" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    *platform.subscription.lock().unwrap() = Some(subscription("https://push.example.com/mine"));
    let mut manager = manager_with(&backend, platform.clone()).await;

    assert!(manager.unsubscribe().await);
    assert!(!manager.state().is_subscribed);
    assert!(platform.current().is_none());
    assert_eq!(manager.state().permission, Permission::Granted);
}

#[tokio::test]
async fn test_backend_unsubscribe_failure_keeps_platform_subscription() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/push/unsubscribe"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Database unavailable"
        })))
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    *platform.subscription.lock().unwrap() = Some(subscription("https://push.example.com/mine"));
    let mut manager = manager_with(&backend, platform.clone()).await;

    assert!(!manager.unsubscribe().await);
    assert!(manager.state().is_subscribed);
    assert!(platform.current().is_some());
    assert!(!platform.calls().iter().any(|c| c.starts_with("unsubscribe:")));
}

#[tokio::test]
async fn test_service_worker_timeout() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;

    let mut platform = FakePlatform::new(Permission::Granted);
    platform.ready = false;
    let platform = Arc::new(platform);
    let mut manager = manager_with(&backend, platform.clone()).await;
    assert!(!manager.state().is_subscribed);

    assert!(!manager.subscribe().await);
    let state = manager.state();
    assert!(!state.is_loading);
    assert!(state.error.as_deref().unwrap().contains("Service worker not ready"));
    assert!(platform.current().is_none());
}

#[tokio::test]
async fn test_send_test_requires_subscription() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    mount_subscribe(&backend, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/push/send-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    let mut manager = manager_with(&backend, platform).await;

    assert!(!manager.send_test().await);
    assert!(manager.state().error.is_some());

    assert!(manager.subscribe().await);
    assert!(manager.send_test().await);
    assert!(manager.state().error.is_none());
}

#[tokio::test]
async fn test_renew_registers_replacement_subscription() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/push/subscribe"))
        .and(body_partial_json(json!({ "endpoint": "https://push.example.com/rotated" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&backend.server)
        .await;

    let platform = Arc::new(FakePlatform::new(Permission::Granted));
    let mut manager = manager_with(&backend, platform).await;
    manager
        .renew(&subscription("https://push.example.com/rotated"))
        .await
        .unwrap();
    assert!(manager.state().is_subscribed);
}

#[tokio::test]
async fn test_dismissed_prompt_is_not_reported_as_denied() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;

    let mut platform = FakePlatform::new(Permission::Default);
    platform.prompt_answer = Permission::Default;
    let platform = Arc::new(platform);
    let mut manager = manager_with(&backend, platform.clone()).await;

    assert!(!manager.subscribe().await);
    let state = manager.state();
    assert_eq!(state.permission, Permission::Default);
    assert_eq!(
        state.error,
        Some(JournalError::PermissionNotGranted.to_string())
    );
    assert_ne!(state.error, Some(JournalError::PermissionDenied.to_string()));
    assert!(platform.current().is_none());
}

#[tokio::test]
async fn test_declined_prompt_is_reported_as_denied() {
    let backend = logged_in_backend().await;
    mount_vapid_key(&backend).await;

    let mut platform = FakePlatform::new(Permission::Default);
    platform.prompt_answer = Permission::Denied;
    let mut manager = manager_with(&backend, Arc::new(platform)).await;

    assert!(!manager.subscribe().await);
    assert_eq!(manager.state().permission, Permission::Denied);
    assert_eq!(
        manager.state().error,
        Some(JournalError::PermissionDenied.to_string())
    );
}
