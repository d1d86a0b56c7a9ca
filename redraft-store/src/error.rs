//! Store error types.

use thiserror::Error;

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another process kept a state file locked for too long.
    #[error("State file is locked by another redraft process: {}", .0.display())]
    Locked(std::path::PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown settings key.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    /// Value cannot be parsed or is out of range.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Settings key.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// Domain rule violated.
    #[error(transparent)]
    Core(#[from] redraft_core::CoreError),
}

impl StoreError {
    /// Returns true if the error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        StoreError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
