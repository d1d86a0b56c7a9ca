//! Provider and model target types.
//!
//! This module contains types describing where a revision is sent:
//! - [`ProviderKind`] - Enum of supported vendors
//! - [`ModelInfo`] - Catalog entry for a single model with its pricing
//! - [`ModelTarget`] - One output slot of a round bound to a model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Provider Kind
// ============================================================================

/// Supported LLM provider kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions
    OpenAi,
    /// Anthropic messages
    Anthropic,
    /// Google Gemini generate-content
    Gemini,
}

impl ProviderKind {
    /// Returns the display name for this provider.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
        }
    }

    /// Returns all available provider kinds.
    pub fn all() -> &'static [ProviderKind] {
        &[Self::OpenAi, Self::Anthropic, Self::Gemini]
    }

    /// Returns the CLI name for this provider (lowercase, no spaces).
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// Environment variable consulted for the API key by default.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Infers the provider from a vendor model name.
    ///
    /// Used when a catalog entry does not name its provider explicitly.
    pub fn from_model_name(model: &str) -> Option<Self> {
        let model = model.trim().to_ascii_lowercase();
        if model.starts_with("gpt-")
            || model.starts_with("o1")
            || model.starts_with("o3")
            || model.starts_with("o4")
        {
            Some(Self::OpenAi)
        } else if model.starts_with("claude-") {
            Some(Self::Anthropic)
        } else if model.starts_with("gem") {
            Some(Self::Gemini)
        } else {
            None
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(CoreError::ProviderNotFound(other.to_string())),
        }
    }
}

// ============================================================================
// Model Info
// ============================================================================

/// A model available for revision, with its pricing.
///
/// Prices are USD per million tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Catalog id (e.g. "claude-sonnet-4").
    pub id: String,
    /// Human-readable label.
    pub display_name: String,
    /// Vendor serving this model.
    pub provider: ProviderKind,
    /// Model name sent on the wire.
    pub api_model: String,
    /// Output token cap, if the vendor enforces one.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    /// Context window size, informational.
    #[serde(default)]
    pub context_window: Option<u32>,
    /// Price per million input tokens.
    pub input_cost_per_million: f64,
    /// Price per million output tokens.
    pub output_cost_per_million: f64,
}

impl ModelInfo {
    /// Creates a new model entry with zero pricing and no caps.
    pub fn new(id: impl Into<String>, provider: ProviderKind) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            api_model: id.clone(),
            id,
            provider,
            max_output_tokens: None,
            context_window: None,
            input_cost_per_million: 0.0,
            output_cost_per_million: 0.0,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the model name sent on the wire.
    #[must_use]
    pub fn with_api_model(mut self, api_model: impl Into<String>) -> Self {
        self.api_model = api_model.into();
        self
    }

    /// Sets per-million pricing.
    #[must_use]
    pub fn with_pricing(mut self, input: f64, output: f64) -> Self {
        self.input_cost_per_million = input;
        self.output_cost_per_million = output;
        self
    }

    /// Sets the output token cap.
    #[must_use]
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Sets the context window.
    #[must_use]
    pub fn with_context_window(mut self, window: u32) -> Self {
        self.context_window = Some(window);
        self
    }

    /// Binds this model to an output slot.
    pub fn to_target(&self, target_id: impl Into<String>) -> ModelTarget {
        ModelTarget {
            id: target_id.into(),
            model: self.clone(),
        }
    }
}

// ============================================================================
// Model Target
// ============================================================================

/// One output slot of a revision round.
///
/// The target id identifies the slot, not the model, so the same model may
/// fill several slots in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTarget {
    /// Slot id (e.g. "output-0").
    pub id: String,
    /// Model assigned to the slot.
    pub model: ModelInfo,
}

impl ModelTarget {
    /// Creates a target from a slot id and a model.
    pub fn new(id: impl Into<String>, model: ModelInfo) -> Self {
        Self {
            id: id.into(),
            model,
        }
    }

    /// Returns the vendor for this target.
    pub fn provider(&self) -> ProviderKind {
        self.model.provider
    }

    /// Returns the model name sent on the wire.
    pub fn api_model(&self) -> &str {
        &self.model.api_model
    }

    /// Returns the output token cap.
    pub fn max_output_tokens(&self) -> Option<u32> {
        self.model.max_output_tokens
    }

    /// Label used in listings and exports.
    pub fn label(&self) -> &str {
        &self.model.display_name
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_model_name() {
        assert_eq!(
            ProviderKind::from_model_name("gpt-4.1-mini"),
            Some(ProviderKind::OpenAi)
        );
        assert_eq!(
            ProviderKind::from_model_name("o3-mini"),
            Some(ProviderKind::OpenAi)
        );
        assert_eq!(
            ProviderKind::from_model_name("claude-sonnet-4-20250514"),
            Some(ProviderKind::Anthropic)
        );
        assert_eq!(
            ProviderKind::from_model_name("gemini-2.5-flash"),
            Some(ProviderKind::Gemini)
        );
        assert_eq!(ProviderKind::from_model_name("llama-3"), None);
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("mistral".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_cli_names_are_unique() {
        let mut names: Vec<_> = ProviderKind::all().iter().map(ProviderKind::cli_name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ProviderKind::all().len());
    }

    #[test]
    fn test_model_to_target() {
        let model = ModelInfo::new("gpt-4.1", ProviderKind::OpenAi)
            .with_display_name("GPT-4.1")
            .with_pricing(2.0, 8.0)
            .with_max_output_tokens(32_768);

        let target = model.to_target("output-1");
        assert_eq!(target.id, "output-1");
        assert_eq!(target.provider(), ProviderKind::OpenAi);
        assert_eq!(target.api_model(), "gpt-4.1");
        assert_eq!(target.max_output_tokens(), Some(32_768));
        assert_eq!(target.label(), "GPT-4.1");
    }
}
