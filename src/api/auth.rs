use crate::api::ApiClient;
use crate::auth::AuthState;
use crate::error::Result;
use crate::models::{AuthData, LoginRequest, RegisterRequest, User, VerifyOtpRequest};
use serde_json::{json, Value};

impl ApiClient {
    /// Log in and persist the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthData = self.post("/auth/login", &request).await?;
        self.store_auth(auth)
    }

    /// Register an account. Depending on the server this either logs the
    /// user in directly or sends a one-time code (`None` is returned then).
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Option<User>> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let data: Value = self.post("/auth/register", &request).await?;
        if data.get("token").is_none() {
            // No session yet: a verification code was sent instead
            return Ok(None);
        }
        let auth: AuthData = serde_json::from_value(data)?;
        self.store_auth(auth).map(Some)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<User> {
        let request = VerifyOtpRequest {
            email: email.to_string(),
            otp: otp.to_string(),
        };
        let auth: AuthData = self.post("/users/verify-otp", &request).await?;
        self.store_auth(auth)
    }

    pub async fn resend_otp(&self, email: &str) -> Result<()> {
        let _: Value = self.post("/users/resend-otp", &json!({ "email": email })).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<User> {
        self.get("/users/me").await
    }

    pub fn logout(&self) -> Result<()> {
        self.auth_store().clear()
    }

    fn store_auth(&self, auth: AuthData) -> Result<User> {
        let state = AuthState::new(auth.token, auth.user);
        self.auth_store().save(&state)?;
        self.log(&format!("stored credentials for {}", state.user.email));
        Ok(state.user)
    }
}
