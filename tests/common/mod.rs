#![allow(dead_code)]

use journal_client::api::ApiClient;
use journal_client::auth::{AuthState, AuthStore, FilesystemAuthStore};
use journal_client::models::User;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

pub const TOKEN: &str = "test-token";

pub struct TestBackend {
    pub server: MockServer,
    pub api: ApiClient,
    pub store: Arc<FilesystemAuthStore>,
    pub dir: TempDir,
}

pub fn test_user() -> User {
    User {
        id: "u1".to_string(),
        email: "ada@example.com".to_string(),
        name: Some("Ada".to_string()),
        timezone: None,
    }
}

/// Mock backend plus a client logged in with `TOKEN`.
pub async fn logged_in_backend() -> TestBackend {
    let backend = anonymous_backend().await;
    backend
        .store
        .save(&AuthState::new(TOKEN.to_string(), test_user()))
        .unwrap();
    backend
}

pub async fn anonymous_backend() -> TestBackend {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilesystemAuthStore::new(dir.path()));
    let api = ApiClient::new(
        &format!("{}/api/v1", server.uri()),
        store.clone(),
        Duration::from_secs(5),
        false,
    )
    .unwrap();
    TestBackend {
        server,
        api,
        store,
        dir,
    }
}

/// Join `data:` lines into an event-stream body.
pub fn sse_body(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| format!("data: {}\n\n", line))
        .collect()
}
