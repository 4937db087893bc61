//! # draftboard-api
//!
//! Typed HTTP wrappers for the remote store's REST API.
//!
//! One [`ApiClient`] is built at startup from an explicit [`ApiConfig`] and
//! handed to every manager; there is no global client.  Per-entity wrappers
//! ([`LogsApi`], [`UsersApi`], ...) translate domain operations into
//! requests, unwrap the `{ "logs": [...] }` style response envelopes, and
//! run every record read from the store through the shared normalization
//! step.

pub mod error;
pub mod logs;
pub mod resources;
pub mod users;
pub mod wiki;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub use error::ApiError;
pub use logs::LogsApi;
pub use resources::ResourcesApi;
pub use users::UsersApi;
pub use wiki::WikiApi;

/// Result alias used by every API call.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Connection settings for the remote store.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the REST API, without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings with the default 30 second timeout.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Shared HTTP client for the remote store.
///
/// Cheap to clone; all clones reuse the same connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| ApiError::InvalidConfig(format!("token is not a valid header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Requests for the `/logs` endpoints, including image upload.
    pub fn logs(&self) -> LogsApi<'_> {
        LogsApi { client: self }
    }

    /// Requests for the `/users` endpoints.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi { client: self }
    }

    /// Requests for the `/wiki` endpoints.
    pub fn wiki(&self) -> WikiApi<'_> {
        WikiApi { client: self }
    }

    /// Requests for the `/resources` endpoints.
    pub fn resources(&self) -> ResourcesApi<'_> {
        ResourcesApi { client: self }
    }

    // -----------------------------------------------------------------------
    // Request plumbing shared by the per-entity wrappers
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json(&self, path: &str) -> Result<Value> {
        self.execute(self.http.get(self.url(path))).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        self.execute(self.http.post(self.url(path)).json(body)).await
    }

    pub(crate) async fn post_empty(&self, path: &str) -> Result<Value> {
        self.execute(self.http.post(self.url(path))).await
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        self.execute(self.http.put(self.url(path)).json(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Value> {
        self.execute(self.http.delete(self.url(path))).await
    }

    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value> {
        // The multipart encoder sets its own content type with the part
        // boundary; nothing else may override it.
        self.execute(self.http.post(self.url(path)).multipart(form))
            .await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Non-2xx responses carry `{ "error": "..." }`; fall back to a
        // generic message when the body is absent or unparseable.
        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("error")?.as_str().map(str::to_string))
            .unwrap_or_else(|| "API request failed".to_string());
        debug!(status = status.as_u16(), %message, "remote store rejected request");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound { message });
        }
        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

// ---------------------------------------------------------------------------
// Envelope unwrapping
// ---------------------------------------------------------------------------

/// Pull the collection out of a `{ "<key>": [...] }` envelope.  A missing
/// or null key means an empty collection, which is what a fresh store
/// serves.
pub(crate) fn take_array(mut body: Value, key: &str) -> Result<Vec<Value>> {
    match body.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(other) => serde_json::from_value(other).map_err(ApiError::Decode),
    }
}

/// Pull the single record out of a `{ "<key>": {...} }` envelope.
pub(crate) fn take_record(mut body: Value, key: &str) -> Result<Value> {
    match body.get_mut(key).map(Value::take) {
        Some(value) if !value.is_null() => Ok(value),
        _ => {
            use serde::de::Error as _;
            Err(ApiError::Decode(serde_json::Error::custom(format!(
                "response envelope is missing `{key}`"
            ))))
        }
    }
}
