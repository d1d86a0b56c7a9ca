//! OpenAI provider descriptor.

use std::sync::Arc;

use redraft_core::ProviderKind;
use redraft_fetch::ProviderAdapter;

use super::adapter::OpenAiAdapter;
use super::api::{API_BASE_URL, CHAT_COMPLETIONS_ENDPOINT};
use crate::descriptor::{ApiConfig, CliConfig, ProviderDescriptor, ProviderMetadata};

/// Creates the OpenAI provider descriptor.
pub fn openai_descriptor() -> ProviderDescriptor {
    ProviderDescriptor {
        id: ProviderKind::OpenAi,
        metadata: openai_metadata(),
        api: ApiConfig {
            base_url: API_BASE_URL,
            endpoint: CHAT_COMPLETIONS_ENDPOINT,
        },
        cli: CliConfig {
            name: "openai",
            aliases: &["gpt", "chatgpt"],
        },
        build_adapter: build_openai_adapter,
    }
}

fn openai_metadata() -> ProviderMetadata {
    ProviderMetadata {
        display_name: "OpenAI",
        api_key_env: ProviderKind::OpenAi.default_api_key_env(),
        api_key_url: "https://platform.openai.com/api-keys",
        status_link_url: Some("https://status.openai.com"),
    }
}

fn build_openai_adapter() -> Arc<dyn ProviderAdapter> {
    Arc::new(OpenAiAdapter::new())
}
