use crate::api::envelope::{extract_error_message, ApiResponse};
use crate::auth::AuthStore;
use crate::config::Config;
use crate::error::{JournalError, Result};
use colored::*;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Paths that answer 401 for bad credentials rather than an expired session.
const AUTH_PATHS: [&str; 2] = ["/auth/login", "/auth/register"];

/// REST client for the journaling backend.
///
/// Every request carries the stored bearer token. A 401 on any path other
/// than login/register clears the stored credentials.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<dyn AuthStore>,
    request_timeout: Duration,
    verbose: bool,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        auth: Arc<dyn AuthStore>,
        request_timeout: Duration,
        verbose: bool,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            request_timeout,
            verbose,
        })
    }

    pub fn from_config(config: &Config, auth: Arc<dyn AuthStore>) -> Result<Self> {
        Self::new(
            &config.api_url,
            auth,
            Duration::from_secs(config.request_timeout),
            config.verbose,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_store(&self) -> &Arc<dyn AuthStore> {
        &self.auth
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn log(&self, message: &str) {
        if self.verbose {
            eprintln!("{}", format!("[api] {}", message).dimmed());
        }
    }

    /// Build a request with the bearer token attached, without the
    /// per-request timeout. Streaming callers apply their own chunk timeout.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.url(path);
        self.log(&format!("{} {}", method, url));

        let mut builder = self.http.request(method, url);
        if let Some(token) = self.auth.token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                JournalError::AuthError(format!("Invalid authorization header: {}", e))
            })?;
            builder = builder.header(AUTHORIZATION, value);
        }
        Ok(builder)
    }

    /// Send a request and fail on any non-success status.
    /// The response body is left unread for the caller.
    pub async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        self.log(&format!("{} -> {}", path, status));

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(self.status_error(path, status, &body))
    }

    fn status_error(&self, path: &str, status: StatusCode, body: &str) -> JournalError {
        if status == StatusCode::UNAUTHORIZED && !AUTH_PATHS.iter().any(|p| path.starts_with(p)) {
            if let Err(e) = self.auth.clear() {
                self.log(&format!("failed to clear stored credentials: {}", e));
            }
            return JournalError::Unauthorized;
        }

        JournalError::ApiError {
            status: status.as_u16(),
            message: extract_error_message(body, status.as_u16()),
        }
    }

    /// Send a request and decode the full response envelope.
    pub async fn send_envelope(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<(u16, ApiResponse<Value>)> {
        let response = self
            .send(path, builder.timeout(self.request_timeout))
            .await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let envelope: ApiResponse<Value> = serde_json::from_str(&text).map_err(|e| {
            JournalError::ApiError {
                status,
                message: format!("Malformed response from server: {}", e),
            }
        })?;
        Ok((status, envelope))
    }

    async fn execute<T: DeserializeOwned>(&self, path: &str, builder: RequestBuilder) -> Result<T> {
        let (status, envelope) = self.send_envelope(path, builder).await?;
        envelope.into_data(status)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path)?;
        self.execute(path, builder).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let builder = self.request(Method::GET, path)?.query(query);
        self.execute(path, builder).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.execute(path, builder).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let builder = self.request(Method::PATCH, path)?.json(body);
        self.execute(path, builder).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path)?;
        let (status, envelope) = self.send_envelope(path, builder).await?;
        // Deletes often answer with data we don't need
        let _: Value = envelope.into_data(status)?;
        Ok(())
    }
}
