//! OpenAI adapter.

use std::borrow::Cow;

use async_trait::async_trait;
use redraft_core::{ModelTarget, NormalizedRequest, ProviderKind};
use redraft_fetch::{FetchContext, ProviderAdapter, ProviderError, RawCompletion, read_json};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::api::{
    API_BASE_URL, CHAT_COMPLETIONS_ENDPOINT, ChatRequest, ChatResponse, is_reasoning_model,
};

/// Sends revisions to OpenAI chat completions.
#[derive(Debug, Clone, Default)]
pub struct OpenAiAdapter;

impl OpenAiAdapter {
    /// Creates a new adapter.
    pub fn new() -> Self {
        Self
    }

    fn headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
            ProviderError::Authentication("API key contains invalid characters".to_string())
        })?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    #[instrument(skip(self, ctx, request), fields(target = %target.id, model = %target.api_model()))]
    async fn invoke(
        &self,
        ctx: &FetchContext,
        target: &ModelTarget,
        request: &NormalizedRequest,
    ) -> Result<RawCompletion, ProviderError> {
        let api_key = ctx.api_key(ProviderKind::OpenAi).await?;
        let url = format!(
            "{}{}",
            ctx.base_url(ProviderKind::OpenAi, API_BASE_URL),
            CHAT_COMPLETIONS_ENDPOINT
        );

        let body = ChatRequest::build(target, request);
        debug!(messages = body.messages.len(), "Sending chat completion");

        let response = ctx.http.post_json(&url, Self::headers(&api_key)?, &body).await?;
        let parsed: ChatResponse = read_json(response).await?;
        parsed.into_completion()
    }

    fn sent_input<'a>(&self, target: &ModelTarget, request: &'a NormalizedRequest) -> Cow<'a, str> {
        if is_reasoning_model(target.api_model()) {
            Cow::Owned(request.combined_prompt())
        } else {
            Cow::Borrowed(&request.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::ModelInfo;

    #[test]
    fn test_sent_input_follows_message_layout() {
        let request = NormalizedRequest::new("Fix this.", "You are an editor.", 0.7);
        let adapter = OpenAiAdapter::new();

        let chat = ModelInfo::new("gpt-4.1", ProviderKind::OpenAi).to_target("output-0");
        assert_eq!(adapter.sent_input(&chat, &request), "Fix this.");

        let reasoning = ModelInfo::new("o3-mini", ProviderKind::OpenAi).to_target("output-0");
        assert_eq!(
            adapter.sent_input(&reasoning, &request),
            "You are an editor.\n\nFix this."
        );
    }
}
