//! Provider descriptor system.
//!
//! A descriptor contains all the static configuration for a provider:
//! - Metadata (display name, credential hints, URLs)
//! - API location (default base URL and endpoint)
//! - CLI names
//! - A constructor for the provider's adapter

use std::sync::Arc;

use redraft_core::ProviderKind;
use redraft_fetch::ProviderAdapter;

// ============================================================================
// Provider Descriptor
// ============================================================================

/// Complete descriptor for a provider.
pub struct ProviderDescriptor {
    /// Provider identifier.
    pub id: ProviderKind,
    /// Display metadata.
    pub metadata: ProviderMetadata,
    /// API location.
    pub api: ApiConfig,
    /// CLI naming.
    pub cli: CliConfig,
    /// Builds the adapter that talks to this provider.
    pub build_adapter: fn() -> Arc<dyn ProviderAdapter>,
}

impl ProviderDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name
    }

    /// Returns the CLI name.
    pub fn cli_name(&self) -> &str {
        self.cli.name
    }

    /// Builds a fresh adapter.
    pub fn adapter(&self) -> Arc<dyn ProviderAdapter> {
        (self.build_adapter)()
    }

    /// Default endpoint URL, before any base URL override.
    pub fn default_endpoint_url(&self) -> String {
        format!("{}{}", self.api.base_url, self.api.endpoint)
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("id", &self.id)
            .field("metadata", &self.metadata)
            .field("api", &self.api)
            .field("cli", &self.cli)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Display and credential metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Human-readable name.
    pub display_name: &'static str,
    /// Environment variable holding the API key.
    pub api_key_env: &'static str,
    /// Where users create API keys.
    pub api_key_url: &'static str,
    /// Public status page.
    pub status_link_url: Option<&'static str>,
}

// ============================================================================
// API Config
// ============================================================================

/// Where the provider's API lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Default base URL.
    pub base_url: &'static str,
    /// Endpoint path; may contain a `{model}` placeholder.
    pub endpoint: &'static str,
}

// ============================================================================
// CLI Config
// ============================================================================

/// Names accepted on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Primary name.
    pub name: &'static str,
    /// Alternative names.
    pub aliases: &'static [&'static str],
}

impl CliConfig {
    /// Returns true if `name` is the primary name or an alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }
}

// ============================================================================
// Tests
// ============================================================================
