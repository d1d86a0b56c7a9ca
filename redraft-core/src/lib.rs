// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Redraft Core
//!
//! Core types, models, and traits for Redraft.
//!
//! This crate provides the vendor-neutral vocabulary shared by every other
//! Redraft crate:
//!
//! - Domain models (providers, targets, requests, results)
//! - Usage normalization and cost arithmetic
//! - Layered prompt resolution
//! - Text preparation and round validation
//! - Error types
//!
//! ## Key Types
//!
//! ### Targets
//! - [`ProviderKind`] - Supported vendors
//! - [`ModelInfo`] - Catalog entry with pricing
//! - [`ModelTarget`] - Output slot bound to a model
//!
//! ### Requests & Results
//! - [`NormalizedRequest`] - One logical request shared by all targets
//! - [`NormalizedResult`] - Exactly one per target per round
//! - [`TargetUpdate`] - Progress notification
//!
//! ### Accounting
//! - [`TokenUsage`] - Reported or estimated token counts
//! - [`calculate_cost`] - Per-million pricing arithmetic
//! - [`SessionTotals`] - Aggregate spend snapshot
//!
//! ### Prompts
//! - [`PromptLayers`] - `current`, `session` and `persistent` overrides

pub mod error;
pub mod models;
pub mod text;
pub mod traits;
pub mod validation;

// Re-export error types
pub use error::{CoreError, ValidationError};

// Re-export all model types
pub use models::{
    // Targets
    ModelInfo,
    ModelTarget,
    ProviderKind,
    // Requests & results
    DEFAULT_TEMPERATURE,
    FailureKind,
    NormalizedRequest,
    NormalizedResult,
    Outcome,
    RevisionBundle,
    RevisionSection,
    TargetUpdate,
    // Accounting
    CostEstimate,
    RawUsage,
    SessionTotals,
    TokenUsage,
    UsageSource,
    calculate_cost,
    estimate_output_tokens,
    estimate_tokens,
    // Prompts
    PromptLayer,
    PromptLayers,
    ResolvedPrompt,
};

// Re-export traits
pub use traits::CostRecorder;

pub use text::{DEFAULT_SYSTEM_MESSAGE, DEFAULT_USER_TEMPLATE};
pub use validation::validate_round;
