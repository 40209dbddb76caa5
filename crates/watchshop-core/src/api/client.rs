//! Request gateway for the WatchShop REST API.
//!
//! `ApiClient` joins paths onto the configured base URL, attaches the
//! session's bearer token when there is one, and maps failures to
//! `ApiError`. It never retries and never refreshes tokens.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, multipart, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::session::SessionShared;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Connection settings for the gateway.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub timeout: Option<Duration>,
    /// Sign out when a request carrying the current token is rejected with 401.
    pub logout_on_unauthorized: bool,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            logout_on_unauthorized: true,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Payload of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(multipart::Form),
}

impl RequestBody {
    pub fn json<B: Serialize>(body: &B) -> Result<Self, ApiError> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Validation(format!("Failed to encode request body: {}", e)))
    }
}

/// One call against the API, built per request and never stored.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn json<B: Serialize>(self, body: &B) -> Result<Self, ApiError> {
        Ok(self.body(RequestBody::json(body)?))
    }

    pub fn multipart(self, form: multipart::Form) -> Self {
        self.body(RequestBody::Multipart(form))
    }

    /// Send without an Authorization header even when signed in.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

// ============================================================================
// Client
// ============================================================================

/// Gateway bound to one session.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionShared>,
    logout_on_unauthorized: bool,
}

impl ApiClient {
    pub(crate) fn new(settings: &ClientSettings, session: Arc<SessionShared>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session,
            logout_on_unauthorized: settings.logout_on_unauthorized,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fail locally when a call needs a signed in user.
    pub(crate) fn require_auth(&self) -> Result<(), ApiError> {
        if self.session.current().is_authenticated() {
            Ok(())
        } else {
            Err(ApiError::NotAuthenticated)
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Perform one call with the given method, path and body.
    pub async fn call(&self, method: Method, path: &str, body: RequestBody) -> Result<Response, ApiError> {
        self.execute(ApiRequest::new(method, path).body(body)).await
    }

    /// Perform one call. Non-2xx responses become `ApiError::Status`.
    pub async fn execute(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let ApiRequest {
            method,
            path,
            query,
            body,
            anonymous,
        } = request;

        let token = if anonymous { None } else { self.session.token() };

        let mut builder = self.client.request(method.clone(), self.url(&path));
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        builder = match body {
            RequestBody::Empty => builder.header(header::CONTENT_TYPE, JSON_CONTENT_TYPE),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };
        if let Some(ref token) = token {
            builder = builder.bearer_auth(token.as_str());
        }

        debug!(method = %method, path = %path, authenticated = token.is_some(), "Sending request");
        let response = builder.send().await?;

        match Self::check_response(response).await {
            Err(err) if err.is_unauthorized() => {
                if let Some(ref token) = token {
                    if self.logout_on_unauthorized && self.session.expire(token) {
                        info!(path = %path, "Token rejected, signed out");
                    }
                }
                Err(err)
            }
            other => other,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Perform a call and decode the JSON response body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path().to_string();
        let response = self.execute(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    /// Perform a call and discard the response body.
    pub async fn send(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.fetch_json(ApiRequest::get(path)).await
    }
}
