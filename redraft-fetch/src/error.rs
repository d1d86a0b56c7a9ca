//! Fetch error types.

use redraft_core::{FailureKind, ProviderKind};
use thiserror::Error;

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for setting up fetch infrastructure.
///
/// Per-call failures are [`ProviderError`]s and never escape the fan-out.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Keychain error.
    #[error("Keychain error: {0}")]
    Keychain(#[from] KeychainError),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] redraft_core::CoreError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// Provider Error
// ============================================================================

/// A single provider call failed.
///
/// Each variant maps onto one [`FailureKind`] tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Missing, invalid or rejected credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Vendor throttled the request.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Seconds the vendor asked us to wait.
        retry_after: Option<u64>,
        /// Vendor message.
        message: String,
    },

    /// Vendor returned an error status or a body we cannot use.
    #[error("{message}")]
    Response {
        /// HTTP status, if there was one.
        status: Option<u16>,
        /// Vendor message or decoding failure.
        message: String,
    },

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Creates a response error without a status.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::Response {
            status: None,
            message: message.into(),
        }
    }

    /// Creates the error for a provider without an API key.
    pub fn missing_credentials(provider: ProviderKind) -> Self {
        Self::Authentication(format!(
            "No API key configured for {provider} (set {} or run `redraft config key set {}`)",
            provider.default_api_key_env(),
            provider.cli_name()
        ))
    }

    /// Returns the stable failure tag.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Authentication(_) => FailureKind::Auth,
            Self::RateLimited { .. } => FailureKind::RateLimit,
            Self::Response { .. } => FailureKind::Response,
            Self::Network(_) => FailureKind::Network,
        }
    }
}

impl From<HttpError> for ProviderError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) if e.is_decode() => Self::invalid_response(e.to_string()),
            HttpError::Request(e) if e.is_timeout() => Self::Network(format!("Request timed out: {e}")),
            HttpError::Request(e) => Self::Network(e.to_string()),
            HttpError::Timeout => Self::Network("Request timed out".to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    /// Timeout.
    #[error("Request timed out")]
    Timeout,
}

// ============================================================================
// Keychain Error
// ============================================================================

/// Error type for keychain operations.
#[derive(Debug, Error)]
pub enum KeychainError {
    /// Credential not found.
    #[error("Credential not found for {service}/{account}")]
    NotFound {
        /// Service name.
        service: String,
        /// Account name.
        account: String,
    },

    /// Access denied.
    #[error("Access denied to keychain")]
    AccessDenied,

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Generic error.
    #[error("Keychain error: {0}")]
    Other(String),
}

impl From<keyring::Error> for KeychainError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => KeychainError::NotFound {
                service: String::new(),
                account: String::new(),
            },
            keyring::Error::Ambiguous(_) => {
                KeychainError::Other("Ambiguous credential entry".to_string())
            }
            keyring::Error::PlatformFailure(e) => KeychainError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => KeychainError::AccessDenied,
            _ => KeychainError::Other(err.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_kinds() {
        assert_eq!(ProviderError::Authentication("x".into()).kind(), FailureKind::Auth);
        assert_eq!(
            ProviderError::RateLimited {
                retry_after: Some(3),
                message: "slow down".into()
            }
            .kind(),
            FailureKind::RateLimit
        );
        assert_eq!(ProviderError::invalid_response("bad").kind(), FailureKind::Response);
        assert_eq!(ProviderError::Network("reset".into()).kind(), FailureKind::Network);
    }

    #[test]
    fn test_missing_credentials_message() {
        let err = ProviderError::missing_credentials(ProviderKind::Gemini);
        assert_eq!(err.kind(), FailureKind::Auth);
        let message = err.to_string();
        assert!(message.contains("GEMINI_API_KEY"));
        assert!(message.contains("config key set gemini"));
    }

    #[test]
    fn test_http_error_maps_to_network() {
        let err = ProviderError::from(HttpError::Build("no TLS backend".into()));
        assert_eq!(err.kind(), FailureKind::Network);
        assert_eq!(ProviderError::from(HttpError::Timeout).kind(), FailureKind::Network);
    }
}
