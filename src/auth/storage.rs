use crate::error::Result;
use crate::models::User;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Persisted login state.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AuthState {
    pub token: String,
    pub user: User,
    pub saved_at: DateTime<Local>,
}

impl AuthState {
    pub fn new(token: String, user: User) -> Self {
        Self {
            token,
            user,
            saved_at: Local::now(),
        }
    }
}

/// Trait for credential storage backends
pub trait AuthStore: Send + Sync {
    /// Load the stored credentials, if any
    fn load(&self) -> Option<AuthState>;

    /// Persist credentials, replacing what was stored
    fn save(&self, state: &AuthState) -> Result<()>;

    /// Forget the stored credentials
    fn clear(&self) -> Result<()>;

    fn token(&self) -> Option<String> {
        self.load().map(|state| state.token)
    }
}
