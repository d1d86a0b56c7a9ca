//! Gemini adapter.

use std::borrow::Cow;

use async_trait::async_trait;
use redraft_core::{ModelTarget, NormalizedRequest, ProviderKind};
use redraft_fetch::{FetchContext, ProviderAdapter, ProviderError, RawCompletion, read_json};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, instrument};

use super::api::{API_BASE_URL, GenerateRequest, GenerateResponse, generate_content_path};

/// Sends revisions to the Gemini API.
#[derive(Debug, Clone, Default)]
pub struct GeminiAdapter;

impl GeminiAdapter {
    /// Creates a new adapter.
    pub fn new() -> Self {
        Self
    }

    fn headers(api_key: &str) -> Result<HeaderMap, ProviderError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).map_err(|_| {
            ProviderError::Authentication("API key contains invalid characters".to_string())
        })?;
        headers.insert("x-goog-api-key", key);
        Ok(headers)
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    #[instrument(skip(self, ctx, request), fields(target = %target.id, model = %target.api_model()))]
    async fn invoke(
        &self,
        ctx: &FetchContext,
        target: &ModelTarget,
        request: &NormalizedRequest,
    ) -> Result<RawCompletion, ProviderError> {
        let api_key = ctx.api_key(ProviderKind::Gemini).await?;
        let url = format!(
            "{}{}",
            ctx.base_url(ProviderKind::Gemini, API_BASE_URL),
            generate_content_path(target.api_model())
        );

        let body = GenerateRequest::build(target, request);
        debug!("Sending generateContent");

        let response = ctx.http.post_json(&url, Self::headers(&api_key)?, &body).await?;
        let parsed: GenerateResponse = read_json(response).await?;
        parsed.into_completion()
    }

    fn sent_input<'a>(&self, _target: &ModelTarget, request: &'a NormalizedRequest) -> Cow<'a, str> {
        Cow::Owned(request.combined_prompt())
    }
}
