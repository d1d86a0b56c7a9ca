//! Core error types for Redraft.

use thiserror::Error;

use crate::models::ProviderKind;

/// A round that must not be dispatched.
///
/// Raised before any network call; rejects the whole round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Text is empty or whitespace only.
    #[error("Text to revise is empty")]
    EmptyText,

    /// Temperature outside `[0, 1]` or not finite.
    #[error("Temperature {0} is outside the range 0.0 to 1.0")]
    TemperatureOutOfRange(f64),

    /// No targets selected.
    #[error("No models selected")]
    NoTargets,

    /// Two targets share a slot id.
    #[error("Duplicate target id: {0}")]
    DuplicateTarget(String),

    /// Model id not present in the catalog.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Model name belongs to a different vendor than the one configured.
    #[error("Model {model} belongs to {actual}, not {expected}")]
    ProviderMismatch {
        /// Wire model name.
        model: String,
        /// Provider configured on the target.
        expected: ProviderKind,
        /// Provider implied by the model name.
        actual: ProviderKind,
    },

    /// No adapter registered for the target's provider.
    #[error("No adapter registered for {0}")]
    NoAdapter(ProviderKind),
}

/// Core error type for Redraft operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Round rejected before dispatch.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Provider name not recognized.
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true if this is a validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
