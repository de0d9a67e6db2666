//! Commerce API client.
//!
//! A thin JSON-over-HTTP client for the commerce REST backend. Each
//! application wraps it with one service module per resource; the client
//! itself only knows about paths, bearer tokens and error mapping.
//!
//! # Errors
//!
//! Non-2xx responses map onto [`ApiError`]:
//!
//! | Status | Variant |
//! |--------|---------|
//! | 401, 403 | [`ApiError::Unauthorized`] |
//! | 404 | [`ApiError::NotFound`] |
//! | 429 | [`ApiError::RateLimited`] |
//! | other | [`ApiError::Api`] with the backend's message |

mod auth;
pub mod geo;

pub use auth::{AccessToken, LoginError, RefreshToken, Refreshed, SessionTokens};
pub use geo::{GeoClient, GeoError};

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Missing, expired or insufficient credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse a response or build a request.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Message suitable for a flash notification.
    ///
    /// Validation messages from the backend pass through; transport failures
    /// collapse to a generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { status, message } if (400..500).contains(status) => message.clone(),
            Self::Unauthorized => "Your session has expired, please sign in again".to_string(),
            Self::NotFound(_) => "The requested record no longer exists".to_string(),
            Self::RateLimited(_) => "Too many requests, please try again shortly".to_string(),
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) => {
                "The service is unavailable, please try again later".to_string()
            }
        }
    }
}

/// A file part of a multipart request.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Text fields and an optional file, sent as `multipart/form-data`.
///
/// Kept as plain data so a request can be rebuilt when it is retried after a
/// token refresh.
#[derive(Debug, Clone, Default)]
pub struct MultipartBody {
    pub fields: Vec<(&'static str, String)>,
    pub file: Option<FileUpload>,
}

impl MultipartBody {
    #[must_use]
    pub const fn new(fields: Vec<(&'static str, String)>) -> Self {
        Self { fields, file: None }
    }

    #[must_use]
    pub fn with_file(mut self, file: Option<FileUpload>) -> Self {
        self.file = file;
        self
    }

    fn to_form(&self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(*name, value.clone());
        }
        if let Some(file) = &self.file {
            let part = reqwest::multipart::Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
                .map_err(|e| ApiError::Parse(format!("Invalid content type: {e}")))?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Commerce API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:8000/api/v1`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client fails to build.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Parse(format!("Invalid API base URL {base_url:?}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Parse(format!("Invalid path {path:?}: {e}")))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self.request_url(method, self.url(path)?, token))
    }

    fn request_url(&self, method: Method, url: Url, token: Option<&AccessToken>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, token), fields(authenticated = token.is_some()))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, token)?.send().await?;
        handle_response(response).await
    }

    /// Execute a GET request with query parameters. Empty values are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, query, token), fields(authenticated = token.is_some()))]
    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let mut url = self.url(path)?;
        let pairs: Vec<_> = query.iter().filter(|(_, v)| !v.is_empty()).collect();
        if !pairs.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let response = self.request_url(Method::GET, url, token).send().await?;
        handle_response(response).await
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        self.send_json(Method::POST, path, body, token).await
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PUT, path, body, token).await
    }

    /// Execute a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        self.send_json(Method::PATCH, path, body, token).await
    }

    /// Execute a DELETE request. Any 2xx counts as success; the body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, token), fields(authenticated = token.is_some()))]
    pub async fn delete(&self, path: &str, token: Option<&AccessToken>) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path, token)?.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response).await)
    }

    /// Execute a DELETE request carrying a JSON body (bulk deletes, unassignments).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn delete_with_body<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, path, token)?
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(parse_error(response).await)
    }

    /// Execute a multipart POST request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &MultipartBody,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::POST, path, token)?
            .multipart(body.to_form()?)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Execute a multipart PATCH request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is not 2xx.
    #[instrument(skip(self, body, token), fields(authenticated = token.is_some()))]
    pub async fn patch_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &MultipartBody,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::PATCH, path, token)?
            .multipart(body.to_form()?)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Check that the API answers. Returns the round-trip time.
    ///
    /// # Errors
    ///
    /// Returns an error if the API is unreachable or answers with a server error.
    pub async fn ping(&self) -> Result<Duration, ApiError> {
        let started = std::time::Instant::now();
        let response = self.request(Method::GET, "order-statuses/", None)?.send().await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(parse_error(response).await);
        }
        debug!(status = status.as_u16(), "API ping");
        Ok(started.elapsed())
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self
            .request(method, path, token)?
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Parse a 2xx body as JSON. An empty body parses as `null`, so `()` and
/// `Option<T>` targets accept `204 No Content`.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(parse_error(response).await);
    }

    let bytes = response.bytes().await?;
    let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
        b"null"
    } else {
        &bytes
    };
    serde_json::from_slice(body).map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")))
}

async fn parse_error(response: reqwest::Response) -> ApiError {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return ApiError::RateLimited(retry_after);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ApiError::Unauthorized;
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = error_message(&body);

    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound(message);
    }

    warn!(status = status.as_u16(), message = %message, "commerce API error");
    ApiError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pull a human message out of an error body.
///
/// Looks at `detail`, `error` and `message`, then at DRF field errors
/// (`{"code": ["already exists"]}`), then falls back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.to_string()
        };
    };

    for key in ["detail", "error", "message"] {
        if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
            return text.to_string();
        }
    }

    let field_errors: Vec<String> = match &value {
        serde_json::Value::Object(map) => map
            .iter()
            .filter_map(|(field, errors)| {
                let first = match errors {
                    serde_json::Value::Array(items) => items.first()?.as_str()?.to_string(),
                    serde_json::Value::String(text) => text.clone(),
                    _ => return None,
                };
                Some(if field == "non_field_errors" {
                    first
                } else {
                    format!("{field}: {first}")
                })
            })
            .collect(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    if field_errors.is_empty() {
        body.trim().to_string()
    } else {
        field_errors.join("; ")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_detail() {
        assert_eq!(error_message(r#"{"detail": "Not allowed"}"#), "Not allowed");
        assert_eq!(error_message(r#"{"error": "Bad coupon"}"#), "Bad coupon");
        assert_eq!(error_message(r#"{"message": "Invalid step."}"#), "Invalid step.");
    }

    #[test]
    fn test_error_message_field_errors() {
        assert_eq!(
            error_message(r#"{"code": ["Coupon code 'X' already exists."]}"#),
            "code: Coupon code 'X' already exists."
        );
        assert_eq!(
            error_message(r#"{"non_field_errors": ["End date cannot be before start date."]}"#),
            "End date cannot be before start date."
        );
    }

    #[test]
    fn test_error_message_raw_body() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message("   "), "Unknown error");
    }

    #[test]
    fn test_paths_resolve_under_base() {
        let client = ApiClient::new("http://localhost:8000/api/v1", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.url("/products/7/").unwrap().as_str(),
            "http://localhost:8000/api/v1/products/7/"
        );
        assert_eq!(
            client.url("orders/temporary/").unwrap().as_str(),
            "http://localhost:8000/api/v1/orders/temporary/"
        );
    }

    #[test]
    fn test_user_message_hides_server_errors() {
        let err = ApiError::Api {
            status: 500,
            message: "Traceback ...".to_string(),
        };
        assert!(!err.user_message().contains("Traceback"));

        let err = ApiError::Api {
            status: 400,
            message: "Quantity exceeds stock".to_string(),
        };
        assert_eq!(err.user_message(), "Quantity exceeds stock");
    }
}
