//! Gemini `generateContent` wire format.
//!
//! # API Endpoint
//!
//! ```text
//! POST https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent
//! x-goog-api-key: <api_key>
//! ```
//!
//! # Request
//!
//! Gemini has no separate system channel here; instruction and text are sent
//! as one concatenated user part.
//!
//! ```json
//! {
//!   "contents": [{"role": "user", "parts": [{"text": "..."}]}],
//!   "generationConfig": {"temperature": 0.7, "maxOutputTokens": 8192}
//! }
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "candidates": [{"content": {"parts": [{"text": "..."}]}}],
//!   "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 98}
//! }
//! ```
//!
//! `usageMetadata` is frequently absent; the caller then estimates.

use redraft_core::{ModelTarget, NormalizedRequest, RawUsage};
use redraft_fetch::{ProviderError, RawCompletion};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Generative Language API.
pub const API_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Path template; `{model}` is replaced by the wire model name.
pub const GENERATE_CONTENT_ENDPOINT: &str = "/v1beta/models/{model}:generateContent";

/// Returns the endpoint path for `model`.
pub fn generate_content_path(model: &str) -> String {
    GENERATE_CONTENT_ENDPOINT.replace("{model}", model)
}

// ============================================================================
// Request Structures
// ============================================================================

/// `generateContent` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Conversation.
    pub contents: Vec<Content>,
    /// Sampling settings.
    pub generation_config: GenerationConfig,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// `user` for requests; may be absent in responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Parts of the turn.
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// One part of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Text, when the part carries text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Sampling settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f64,
    /// Output cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerateRequest {
    /// Builds the request for a target.
    pub fn build(target: &ModelTarget, request: &NormalizedRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(request.combined_prompt()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: target.max_output_tokens(),
            },
        }
    }
}

// ============================================================================
// Response Structures
// ============================================================================

/// `generateContent` response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Generated candidates.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Token usage.
    pub usage_metadata: Option<UsageMetadata>,
    /// Set when the prompt itself was rejected.
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One generated candidate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Generated content.
    pub content: Option<Content>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Usage block.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Prompt tokens.
    pub prompt_token_count: Option<u64>,
    /// Completion tokens.
    pub candidates_token_count: Option<u64>,
}

/// Prompt rejection details.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked.
    pub block_reason: Option<String>,
}

impl From<UsageMetadata> for RawUsage {
    fn from(usage: UsageMetadata) -> Self {
        RawUsage {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
        }
    }
}

impl GenerateResponse {
    /// Extracts the first text part of the first candidate that has one.
    pub fn into_completion(self) -> Result<RawCompletion, ProviderError> {
        let usage = self.usage_metadata.map(RawUsage::from);

        let text = self
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .find_map(|part| part.text.filter(|t| !t.trim().is_empty()));

        if let Some(text) = text {
            return Ok(RawCompletion::new(text, usage));
        }

        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(ProviderError::invalid_response(format!(
                "Prompt blocked: {reason}"
            ))),
            None => Err(ProviderError::invalid_response("Empty content in response")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
