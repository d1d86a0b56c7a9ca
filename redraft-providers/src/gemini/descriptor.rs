//! Gemini provider descriptor.

use std::sync::Arc;

use redraft_core::ProviderKind;
use redraft_fetch::ProviderAdapter;

use super::adapter::GeminiAdapter;
use super::api::{API_BASE_URL, GENERATE_CONTENT_ENDPOINT};
use crate::descriptor::{ApiConfig, CliConfig, ProviderDescriptor, ProviderMetadata};

/// Creates the Gemini provider descriptor.
pub fn gemini_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::Gemini,
        metadata: gemini_metadata(),
        api: ApiConfig {
            base_url: API_BASE_URL,
            endpoint: GENERATE_CONTENT_ENDPOINT,
        },
        cli: CliConfig {
            name: "gemini",
            aliases: &["google"],
        },
        build_adapter: build_gemini_adapter,
    }
}

fn gemini_metadata() -> ProviderMetadata {
    ProviderMetadata {
        display_name: "Gemini",
        api_key_env: ProviderKind::Gemini.default_api_key_env(),
        api_key_url: "https://aistudio.google.com/app/apikey",
        status_link_url: None,
    }
}

fn build_gemini_adapter() -> Arc<dyn ProviderAdapter> {
    Arc::new(GeminiAdapter::new())
}
