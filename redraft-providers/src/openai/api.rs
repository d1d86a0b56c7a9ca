//! OpenAI chat completions wire format.
//!
//! # API Endpoint
//!
//! ```text
//! POST https://api.openai.com/v1/chat/completions
//! Authorization: Bearer <api_key>
//! ```
//!
//! # Request
//!
//! ```json
//! {
//!   "model": "gpt-4.1",
//!   "messages": [
//!     {"role": "system", "content": "..."},
//!     {"role": "user", "content": "..."}
//!   ],
//!   "temperature": 0.7,
//!   "max_tokens": 32768
//! }
//! ```
//!
//! Reasoning models (`o1`, `o3`, `o4` families) reject the system role and a
//! fixed temperature, so the instruction is folded into the user message and
//! the cap is sent as `max_completion_tokens`.
//!
//! # Response
//!
//! ```json
//! {
//!   "choices": [{"message": {"role": "assistant", "content": "..."}}],
//!   "usage": {"prompt_tokens": 120, "completion_tokens": 98}
//! }
//! ```

use redraft_core::{ModelTarget, NormalizedRequest, RawUsage};
use redraft_fetch::{ProviderError, RawCompletion};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the OpenAI API.
pub const API_BASE_URL: &str = "https://api.openai.com";

/// Chat completions endpoint.
pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/v1/chat/completions";

/// Model name prefixes of the reasoning families.
const REASONING_PREFIXES: &[&str] = &["o1", "o3", "o4"];

/// Returns true for models that take no system role or temperature.
pub fn is_reasoning_model(model: &str) -> bool {
    let model = model.trim().to_ascii_lowercase();
    REASONING_PREFIXES.iter().any(|prefix| model.starts_with(prefix))
}

// ============================================================================
// Request Structures
// ============================================================================

/// Chat completions request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Wire model name.
    pub model: String,
    /// Conversation.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature; omitted for reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Output cap for classic chat models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Output cap for reasoning models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// `system` or `user`.
    pub role: &'static str,
    /// Message text.
    pub content: String,
}

impl ChatRequest {
    /// Builds the request for a target.
    pub fn build(target: &ModelTarget, request: &NormalizedRequest) -> Self {
        let model = target.api_model().to_string();
        let cap = target.max_output_tokens();

        if is_reasoning_model(&model) {
            Self {
                model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: request.combined_prompt(),
                }],
                temperature: None,
                max_tokens: None,
                max_completion_tokens: cap,
            }
        } else {
            Self {
                model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: request.system_instruction.clone(),
                    },
                    ChatMessage {
                        role: "user",
                        content: request.text.clone(),
                    },
                ],
                temperature: Some(request.temperature),
                max_tokens: cap,
                max_completion_tokens: None,
            }
        }
    }
}

// ============================================================================
// Response Structures
// ============================================================================

/// Chat completions response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Generated choices.
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage.
    pub usage: Option<ChatUsage>,
}

/// One generated choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// Assistant message.
    pub message: Option<ResponseMessage>,
    /// Why generation stopped.
    pub finish_reason: Option<String>,
}

/// Assistant message.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated text.
    pub content: Option<String>,
    /// Refusal text, if the model declined.
    pub refusal: Option<String>,
}

/// Usage block.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChatUsage {
    /// Prompt tokens.
    pub prompt_tokens: Option<u64>,
    /// Completion tokens.
    pub completion_tokens: Option<u64>,
}

impl From<ChatUsage> for RawUsage {
    fn from(usage: ChatUsage) -> Self {
        RawUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        }
    }
}

impl ChatResponse {
    /// Extracts the first message with text content.
    pub fn into_completion(self) -> Result<RawCompletion, ProviderError> {
        let usage = self.usage.map(RawUsage::from);
        let mut refusal = None;

        for choice in self.choices {
            let Some(message) = choice.message else {
                continue;
            };
            if let Some(content) = message.content.filter(|c| !c.trim().is_empty()) {
                return Ok(RawCompletion::new(content, usage));
            }
            if refusal.is_none() {
                refusal = message.refusal;
            }
        }

        Err(ProviderError::invalid_response(match refusal {
            Some(reason) => format!("Model refused: {reason}"),
            None => "Empty content in response".to_string(),
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
