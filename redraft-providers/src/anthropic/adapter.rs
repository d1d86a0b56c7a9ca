//! Anthropic adapter.

use async_trait::async_trait;
use redraft_core::{ModelTarget, NormalizedRequest, ProviderKind};
use redraft_fetch::{FetchContext, ProviderAdapter, ProviderError, RawCompletion, read_json};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::api::{ANTHROPIC_VERSION, API_BASE_URL, MESSAGES_ENDPOINT, MessagesRequest, MessagesResponse};

/// Sends revisions to the Anthropic Messages API.
#[derive(Debug, Clone, Default)]
pub struct AnthropicAdapter;

impl AnthropicAdapter {
    /// Creates a new adapter.
    pub fn new() -> Self {
        Self
    }

    fn headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| {
            ProviderError::Authentication("API key contains invalid characters".to_string())
        })?;
        headers.insert("x-api-key", key);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    #[instrument(skip(self, ctx, request), fields(target = %target.id, model = %target.api_model()))]
    async fn invoke(
        &self,
        ctx: &FetchContext,
        target: &ModelTarget,
        request: &NormalizedRequest,
    ) -> Result<RawCompletion, ProviderError> {
        let api_key = ctx.api_key(ProviderKind::Anthropic).await?;
        let url = format!(
            "{}{}",
            ctx.base_url(ProviderKind::Anthropic, API_BASE_URL),
            MESSAGES_ENDPOINT
        );

        let body = MessagesRequest::build(target, request);
        debug!(max_tokens = body.max_tokens, "Sending message");

        let response = ctx.http.post_json(&url, Self::headers(&api_key)?, &body).await?;
        let parsed: MessagesResponse = read_json(response).await?;
        parsed.into_completion()
    }
}
