//! Cost types.
//!
//! This module contains the pricing arithmetic:
//! - [`calculate_cost`] - Cost of a completion from token counts and rates
//! - [`CostEstimate`] - Pre-submission estimate for one target
//! - [`SessionTotals`] - Aggregate spend snapshot

use serde::{Deserialize, Serialize};

use super::provider::{ModelInfo, ModelTarget};
use super::usage::{TokenUsage, estimate_output_tokens, estimate_tokens};

/// Token count the per-million rates refer to.
pub const TOKENS_PER_RATE_UNIT: f64 = 1_000_000.0;

// ============================================================================
// Cost Calculation
// ============================================================================

/// Computes `(input * rate_in + output * rate_out) / 1_000_000`.
///
/// Rates are USD per million tokens. The result is not rounded.
#[allow(clippy::cast_precision_loss)]
pub fn calculate_cost(input_tokens: u64, output_tokens: u64, rate_in: f64, rate_out: f64) -> f64 {
    (input_tokens as f64 * rate_in + output_tokens as f64 * rate_out) / TOKENS_PER_RATE_UNIT
}

impl ModelInfo {
    /// Cost of the given usage at this model's rates.
    pub fn cost_for(&self, usage: &TokenUsage) -> f64 {
        calculate_cost(
            usage.input_tokens,
            usage.output_tokens,
            self.input_cost_per_million,
            self.output_cost_per_million,
        )
    }
}

// ============================================================================
// Cost Estimate
// ============================================================================

/// Pre-submission cost estimate for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Slot id.
    pub target_id: String,
    /// Catalog model id.
    pub model_id: String,
    /// Estimated prompt tokens (instruction plus text).
    pub input_tokens: u64,
    /// Estimated completion tokens.
    pub output_tokens: u64,
    /// Estimated cost in USD.
    pub cost: f64,
}

impl CostEstimate {
    /// Estimates the cost of revising `text` under `instruction` on `target`.
    ///
    /// Input is the instruction and text joined the way they are sent.
    /// Output is derived from the text alone.
    pub fn for_target(target: &ModelTarget, instruction: &str, text: &str) -> Self {
        let input_tokens = estimate_tokens(&format!("{instruction}\n\n{text}"));
        let output_tokens =
            estimate_output_tokens(estimate_tokens(text), target.max_output_tokens());
        let cost = calculate_cost(
            input_tokens,
            output_tokens,
            target.model.input_cost_per_million,
            target.model.output_cost_per_million,
        );

        Self {
            target_id: target.id.clone(),
            model_id: target.model.id.clone(),
            input_tokens,
            output_tokens,
            cost,
        }
    }

    /// Total estimated tokens.
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

// ============================================================================
// Session Totals
// ============================================================================

/// Consistent snapshot of session spend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Sum of all recorded costs in USD.
    pub total_cost: f64,
    /// Number of successful requests recorded.
    pub request_count: u64,
}

impl SessionTotals {
    /// Average cost per request, if any were made.
    #[allow(clippy::cast_precision_loss)]
    pub fn average_cost(&self) -> Option<f64> {
        if self.request_count == 0 {
            return None;
        }
        Some(self.total_cost / self.request_count as f64)
    }
}

// ============================================================================
// Tests
// ============================================================================
