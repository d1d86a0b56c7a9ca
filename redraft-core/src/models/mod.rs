//! Domain models for Redraft.
//!
//! ## Submodules
//!
//! - [`provider`] - Provider kinds, catalog entries and round targets
//! - [`request`] - The vendor-neutral request
//! - [`result`] - Per-target results, updates and export bundles
//! - [`usage`] - Token usage normalization and estimation
//! - [`cost`] - Cost arithmetic and estimates
//! - [`prompt`] - Layered instruction overrides

pub mod cost;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod result;
pub mod usage;

// Re-export everything at the models level
pub use cost::{CostEstimate, SessionTotals, calculate_cost};
pub use prompt::{PromptLayer, PromptLayers, ResolvedPrompt};
pub use provider::{ModelInfo, ModelTarget, ProviderKind};
pub use request::{DEFAULT_TEMPERATURE, MAX_TEMPERATURE, MIN_TEMPERATURE, NormalizedRequest};
pub use result::{
    FailureKind, NormalizedResult, Outcome, RevisionBundle, RevisionSection, TargetUpdate,
};
pub use usage::{RawUsage, TokenUsage, UsageSource, estimate_output_tokens, estimate_tokens};

#[cfg(test)]
mod serde_tests;
