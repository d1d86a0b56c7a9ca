//! Token usage types and the usage normalizer.
//!
//! Vendors disagree on whether and how they report token counts. Everything
//! downstream of an adapter works with [`TokenUsage`], which is always present
//! and never negative:
//!
//! - reported counters are used verbatim
//! - missing counters are estimated at one token per four characters

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::provider::ProviderKind;

/// Characters per token assumed by the estimator.
pub const CHARS_PER_TOKEN: u64 = 4;

/// Input-token threshold below which the small expansion factor applies.
pub const EXPANSION_THRESHOLD_SMALL: u64 = 100;
/// Input-token threshold below which the medium expansion factor applies.
pub const EXPANSION_THRESHOLD_MEDIUM: u64 = 500;
/// Output expansion for short inputs.
pub const EXPANSION_SMALL: f64 = 1.2;
/// Output expansion for medium inputs.
pub const EXPANSION_MEDIUM: f64 = 1.1;
/// Output expansion for long inputs.
pub const EXPANSION_LARGE: f64 = 1.05;
/// Safety margin applied on top of the expansion.
pub const OUTPUT_BUFFER_FACTOR: f64 = 1.05;

// ============================================================================
// Raw Usage
// ============================================================================

/// Token counters as a vendor reported them.
///
/// Either counter may be missing inside an otherwise present usage block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUsage {
    /// Reported prompt tokens.
    pub input_tokens: Option<u64>,
    /// Reported completion tokens.
    pub output_tokens: Option<u64>,
}

impl RawUsage {
    /// Creates a raw usage block with both counters present.
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
        }
    }
}

// ============================================================================
// Token Usage
// ============================================================================

/// Where a [`TokenUsage`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageSource {
    /// Vendor reported the counters.
    Reported,
    /// Counters were estimated from text length.
    Estimated,
}

/// Normalized token usage for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Completion tokens.
    pub output_tokens: u64,
    /// Whether the counts were reported or estimated.
    pub source: UsageSource,
}

impl TokenUsage {
    /// Creates a reported usage value.
    pub fn reported(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            source: UsageSource::Reported,
        }
    }

    /// Creates an estimated usage value from the two texts.
    pub fn estimated(input_text: &str, output_text: &str) -> Self {
        Self {
            input_tokens: estimate_tokens(input_text),
            output_tokens: estimate_tokens(output_text),
            source: UsageSource::Estimated,
        }
    }

    /// Normalizes whatever a vendor returned into a complete usage value.
    ///
    /// A present usage block wins even when one of its counters is missing;
    /// that counter becomes 0. Without a usage block both sides are
    /// estimated from the fallback texts.
    pub fn normalize(
        raw: Option<&RawUsage>,
        provider: ProviderKind,
        fallback_input: &str,
        fallback_output: &str,
    ) -> Self {
        if let Some(raw) = raw {
            let usage = Self::reported(
                raw.input_tokens.unwrap_or(0),
                raw.output_tokens.unwrap_or(0),
            );
            debug!(
                provider = ?provider,
                input = usage.input_tokens,
                output = usage.output_tokens,
                "Using reported usage"
            );
            usage
        } else {
            let usage = Self::estimated(fallback_input, fallback_output);
            debug!(
                provider = ?provider,
                input = usage.input_tokens,
                output = usage.output_tokens,
                "Usage not reported, estimated from text length"
            );
            usage
        }
    }

    /// Total tokens.
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    /// Returns true if the counts are estimates.
    pub fn is_estimated(&self) -> bool {
        self.source == UsageSource::Estimated
    }
}

// ============================================================================
// Estimators
// ============================================================================

/// Estimates tokens as `ceil(chars / 4)`.
///
/// Counts Unicode scalar values, so the estimate does not depend on encoding.
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(CHARS_PER_TOKEN)
}

/// Estimates how many tokens a revision of `input_tokens` will produce.
///
/// Short inputs tend to expand more than long ones. The result is capped at
/// the model's output limit when there is one.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn estimate_output_tokens(input_tokens: u64, max_output_tokens: Option<u32>) -> u64 {
    let factor = if input_tokens < EXPANSION_THRESHOLD_SMALL {
        EXPANSION_SMALL
    } else if input_tokens < EXPANSION_THRESHOLD_MEDIUM {
        EXPANSION_MEDIUM
    } else {
        EXPANSION_LARGE
    };

    let expanded = (input_tokens as f64 * factor) as u64;
    let buffered = (expanded as f64 * OUTPUT_BUFFER_FACTOR) as u64;

    match max_output_tokens {
        Some(max) => buffered.min(u64::from(max)),
        None => buffered,
    }
}

// ============================================================================
// Tests
// ============================================================================
