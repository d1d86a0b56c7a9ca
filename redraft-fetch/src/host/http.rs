//! HTTP client with tracing and vendor error mapping.
//!
//! One client is shared by every adapter of a round. Requests carry a
//! whole-request timeout; non-2xx bodies are mapped onto [`ProviderError`]
//! variants by [`read_json`].

use reqwest::{Client, Response, StatusCode, header, header::HeaderMap};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::{HttpError, ProviderError};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// User agent string for Redraft.
const USER_AGENT: &str = concat!("Redraft/", env!("CARGO_PKG_VERSION"));

/// Longest body excerpt kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 300;

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client with the default timeout.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom timeout.
    ///
    /// The timeout covers the whole request, including reading the body.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self { inner: client })
    }

    /// Performs a POST request with a JSON body and custom headers.
    #[instrument(skip(self, headers, body), fields(url = %url))]
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        headers: HeaderMap,
        body: &T,
    ) -> Result<Response, HttpError> {
        debug!("POST request with JSON");

        let response = self
            .inner
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Check if the vendor rejected our credentials.
    fn is_auth_failure(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS
    }

    fn is_auth_failure(&self) -> bool {
        matches!(self.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }

    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

/// Pulls `error.message` (or a string `error`) out of a vendor error body.
///
/// OpenAI, Anthropic and Google all nest the message this way. Falls back to
/// a trimmed excerpt of the raw body.
pub fn vendor_error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let error = &value["error"];
        if let Some(message) = error["message"].as_str().or_else(|| error.as_str()) {
            return Some(message.to_string());
        }
        if let Some(message) = value["message"].as_str() {
            return Some(message.to_string());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect())
    }
}

/// Decodes a successful JSON response or maps the failure.
///
/// - 401/403 become [`ProviderError::Authentication`]
/// - 429 becomes [`ProviderError::RateLimited`] with `Retry-After`
/// - any other non-2xx becomes [`ProviderError::Response`]
/// - an undecodable 2xx body becomes [`ProviderError::Response`]
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    let status = response.status();

    if response.is_rate_limited() {
        let retry_after = response.retry_after_secs();
        let body = response.text().await.unwrap_or_default();
        let message = vendor_error_message(&body).unwrap_or_else(|| "Too many requests".to_string());
        warn!(retry_after = ?retry_after, "Rate limited");
        return Err(ProviderError::RateLimited {
            retry_after,
            message,
        });
    }

    if response.is_auth_failure() {
        let body = response.text().await.unwrap_or_default();
        let message = vendor_error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));
        warn!(status = %status, "Authentication rejected");
        return Err(ProviderError::Authentication(message));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::Network(format!("Failed to read response body: {e}")))?;

    if !status.is_success() {
        let detail = vendor_error_message(&body).unwrap_or_else(|| "no error details".to_string());
        warn!(status = %status, "Provider returned error status");
        return Err(ProviderError::Response {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}: {detail}"),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| ProviderError::invalid_response(format!("Failed to parse response: {e}")))
}

// ============================================================================
// Tests
// ============================================================================
