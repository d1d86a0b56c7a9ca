//! Anthropic provider descriptor.

use std::sync::Arc;

use redraft_core::ProviderKind;
use redraft_fetch::ProviderAdapter;

use super::adapter::AnthropicAdapter;
use super::api::{API_BASE_URL, MESSAGES_ENDPOINT};
use crate::descriptor::{ApiConfig, CliConfig, ProviderDescriptor, ProviderMetadata};

/// Creates the Anthropic provider descriptor.
pub fn anthropic_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Anthropic,
        metadata: anthropic_metadata(),
        api: ApiConfig {
            base_url: API_BASE_URL,
            endpoint: MESSAGES_ENDPOINT,
        },
        cli: CliConfig {
            name: "anthropic",
            aliases: &["claude"],
        },
        build_adapter: build_anthropic_adapter,
    }
}

fn anthropic_metadata() -> ProviderMetadata {
    ProviderMetadata {
        display_name: "Anthropic",
        api_key_env: ProviderKind::Anthropic.default_api_key_env(),
        api_key_url: "https://console.anthropic.com/settings/keys",
        status_link_url: Some("https://status.anthropic.com"),
    }
}

fn build_anthropic_adapter() -> Arc<dyn ProviderAdapter> {
    Arc::new(AnthropicAdapter::new())
}
