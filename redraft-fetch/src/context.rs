//! Fetch context providing access to host APIs.
//!
//! The context is shared by every adapter call in a round. It bundles the
//! HTTP client, the keychain and per-provider endpoint settings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use redraft_core::ProviderKind;
use tracing::{debug, warn};

use crate::error::{FetchError, ProviderError};
use crate::host::http::{DEFAULT_TIMEOUT_SECS, HttpClient};
use crate::host::keychain::{KeychainApi, SystemKeychain, stored_api_key};

// ============================================================================
// Provider Endpoint
// ============================================================================

/// Per-provider connection overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderEndpoint {
    /// API key given directly; wins over every other source.
    pub api_key: Option<String>,
    /// Environment variable to read instead of the default one.
    pub api_key_env: Option<String>,
    /// Base URL replacing the vendor default (proxies, tests).
    pub base_url: Option<String>,
}

impl ProviderEndpoint {
    /// Creates an endpoint with an explicit key.
    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for provider calls.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Whole-request timeout applied by the HTTP client.
    pub timeout: Duration,
    /// Endpoint overrides by provider.
    pub endpoints: HashMap<ProviderKind, ProviderEndpoint>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoints: HashMap::new(),
        }
    }
}

impl FetchSettings {
    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the endpoint for one provider.
    #[must_use]
    pub fn with_endpoint(mut self, provider: ProviderKind, endpoint: ProviderEndpoint) -> Self {
        self.endpoints.insert(provider, endpoint);
        self
    }

    /// Returns the endpoint overrides for a provider.
    pub fn endpoint(&self, provider: ProviderKind) -> Option<&ProviderEndpoint> {
        self.endpoints.get(&provider)
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context handed to provider adapters.
pub struct FetchContext {
    /// Secure credential storage.
    pub keychain: Arc<dyn KeychainApi>,
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Fetch settings.
    pub settings: FetchSettings,
}

impl FetchContext {
    /// Creates a context with the system keychain and default settings.
    pub fn new() -> Result<Self, FetchError> {
        Self::builder().build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Returns the base URL for a provider, falling back to `default`.
    ///
    /// Trailing slashes are stripped so callers can append paths.
    pub fn base_url(&self, provider: ProviderKind, default: &str) -> String {
        self.settings
            .endpoint(provider)
            .and_then(|e| e.base_url.as_deref())
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    /// Resolves the API key for a provider.
    ///
    /// Sources in order: explicit key, environment variable, keychain.
    pub async fn api_key(&self, provider: ProviderKind) -> Result<String, ProviderError> {
        let endpoint = self.settings.endpoint(provider);

        if let Some(key) = endpoint.and_then(|e| e.api_key.as_deref()) {
            if !key.trim().is_empty() {
                debug!(provider = ?provider, source = "settings", "API key resolved");
                return Ok(key.trim().to_string());
            }
        }

        let env_name = endpoint
            .and_then(|e| e.api_key_env.as_deref())
            .unwrap_or_else(|| provider.default_api_key_env());
        if let Ok(key) = std::env::var(env_name) {
            if !key.trim().is_empty() {
                debug!(provider = ?provider, source = "env", var = env_name, "API key resolved");
                return Ok(key.trim().to_string());
            }
        }

        match stored_api_key(self.keychain.as_ref(), provider).await {
            Ok(Some(key)) => {
                debug!(provider = ?provider, source = "keychain", "API key resolved");
                Ok(key)
            }
            Ok(None) => Err(ProviderError::missing_credentials(provider)),
            Err(e) => {
                warn!(provider = ?provider, error = %e, "Keychain lookup failed");
                Err(ProviderError::Authentication(format!(
                    "No API key in {env_name} and keychain lookup failed: {e}"
                )))
            }
        }
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("timeout", &self.settings.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    keychain: Option<Arc<dyn KeychainApi>>,
    http: Option<Arc<HttpClient>>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            keychain: None,
            http: None,
            settings: FetchSettings::default(),
        }
    }

    /// Sets the keychain implementation.
    #[must_use]
    pub fn keychain(mut self, keychain: Arc<dyn KeychainApi>) -> Self {
        self.keychain = Some(keychain);
        self
    }

    /// Sets the HTTP client. Overrides the timeout in the settings.
    #[must_use]
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the fetch settings.
    #[must_use]
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Builds the context.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(HttpClient::with_timeout(self.settings.timeout)?),
        };

        Ok(FetchContext {
            keychain: self
                .keychain
                .unwrap_or_else(|| Arc::new(SystemKeychain::new())),
            http,
            settings: self.settings,
        })
    }
}

impl Default for FetchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
