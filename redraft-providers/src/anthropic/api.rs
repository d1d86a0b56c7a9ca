//! Anthropic Messages API wire format.
//!
//! # API Endpoint
//!
//! ```text
//! POST https://api.anthropic.com/v1/messages
//! x-api-key: <api_key>
//! anthropic-version: 2023-06-01
//! ```
//!
//! # Request
//!
//! ```json
//! {
//!   "model": "claude-sonnet-4-20250514",
//!   "system": "...",
//!   "messages": [{"role": "user", "content": "..."}],
//!   "temperature": 0.7,
//!   "max_tokens": 64000
//! }
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "content": [{"type": "text", "text": "..."}],
//!   "usage": {"input_tokens": 120, "output_tokens": 98}
//! }
//! ```

use redraft_core::{ModelTarget, NormalizedRequest, RawUsage};
use redraft_fetch::{ProviderError, RawCompletion};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Anthropic API.
pub const API_BASE_URL: &str = "https://api.anthropic.com";

/// Messages endpoint.
pub const MESSAGES_ENDPOINT: &str = "/v1/messages";

/// API version header value.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// `max_tokens` is mandatory; used when the model has no configured cap.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

// ============================================================================
// Request Structures
// ============================================================================

/// Messages request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesRequest {
    /// Wire model name.
    pub model: String,
    /// System prompt.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub system: String,
    /// Conversation.
    pub messages: Vec<Message>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Output cap.
    pub max_tokens: u32,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Always `user` here.
    pub role: &'static str,
    /// Turn text.
    pub content: String,
}

impl MessagesRequest {
    /// Builds the request for a target.
    pub fn build(target: &ModelTarget, request: &NormalizedRequest) -> Self {
        Self {
            model: target.api_model().to_string(),
            system: request.system_instruction.clone(),
            messages: vec![Message {
                role: "user",
                content: request.text.clone(),
            }],
            temperature: request.temperature,
            max_tokens: target.max_output_tokens().unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

// ============================================================================
// Response Structures
// ============================================================================

/// Messages response body.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    /// Content blocks.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage.
    pub usage: Option<MessagesUsage>,
}

/// One content block.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    /// Block type (`text`, `thinking`, `tool_use`, ...).
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text for `text` blocks.
    pub text: Option<String>,
}

/// Usage block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MessagesUsage {
    /// Prompt tokens.
    pub input_tokens: Option<u64>,
    /// Completion tokens.
    pub output_tokens: Option<u64>,
}

impl From<MessagesUsage> for RawUsage {
    fn from(usage: MessagesUsage) -> Self {
        RawUsage {
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
        }
    }
}

impl MessagesResponse {
    /// Extracts the first text block.
    pub fn into_completion(self) -> Result<RawCompletion, ProviderError> {
        let usage = self.usage.map(RawUsage::from);
        self.content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .find_map(|block| block.text.filter(|t| !t.trim().is_empty()))
            .map(|text| RawCompletion::new(text, usage))
            .ok_or_else(|| ProviderError::invalid_response("Empty content in response"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::{ModelInfo, ProviderKind};
    use serde_json::json;

    fn target(cap: Option<u32>) -> ModelTarget {
        let mut info = ModelInfo::new("claude-sonnet-4-20250514", ProviderKind::Anthropic);
        info.max_output_tokens = cap;
        info.to_target("output-1")
    }

    #[test]
    fn test_request_shape() {
        let request = NormalizedRequest::new("Fix this.", "You are an editor.", 0.7);
        let value = serde_json::to_value(MessagesRequest::build(&target(Some(64_000)), &request)).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "claude-sonnet-4-20250514",
                "system": "You are an editor.",
                "messages": [{"role": "user", "content": "Fix this."}],
                "temperature": 0.7,
                "max_tokens": 64000
            })
        );
    }

    #[test]
    fn test_request_defaults() {
        let request = NormalizedRequest::new("Fix this.", "", 0.0);
        let value = serde_json::to_value(MessagesRequest::build(&target(None), &request)).unwrap();

        assert!(value.get("system").is_none());
        assert_eq!(value["max_tokens"], json!(DEFAULT_MAX_TOKENS));
    }

    #[test]
    fn test_response_skips_non_text_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "type": "message",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "Fixed."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 30, "output_tokens": 4}
        }))
        .unwrap();

        let completion = response.into_completion().unwrap();
        assert_eq!(completion.text, "Fixed.");
        assert_eq!(completion.usage, Some(RawUsage::new(30, 4)));
    }

    #[test]
    fn test_response_partial_usage() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "Fixed."}],
            "usage": {"output_tokens": 4}
        }))
        .unwrap();

        let usage = response.into_completion().unwrap().usage.unwrap();
        assert_eq!(usage.input_tokens, None);
        assert_eq!(usage.output_tokens, Some(4));
    }

    #[test]
    fn test_response_without_text() {
        let response: MessagesResponse =
            serde_json::from_value(json!({"content": [], "usage": null})).unwrap();
        assert!(response.into_completion().is_err());
    }

    #[test]
    fn test_response_skips_blank_blocks() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": ""},
                {"type": "text", "text": "Fixed."}
            ]
        }))
        .unwrap();
        assert_eq!(response.into_completion().unwrap().text, "Fixed.");

        let blank: MessagesResponse = serde_json::from_value(json!({
            "content": [{"type": "text", "text": "   "}],
            "usage": {"input_tokens": 30, "output_tokens": 0}
        }))
        .unwrap();
        let err = blank.into_completion().unwrap_err();
        assert!(err.to_string().contains("Empty content in response"));
    }
}
