//! The vendor-neutral revision request.

use serde::{Deserialize, Serialize};

/// Lowest accepted sampling temperature.
pub const MIN_TEMPERATURE: f64 = 0.0;
/// Highest accepted sampling temperature.
pub const MAX_TEMPERATURE: f64 = 1.0;
/// Temperature used when the user has not picked one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// One logical revision request, shared by every target of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRequest {
    /// User message, already templated.
    pub text: String,
    /// Resolved system instruction.
    pub system_instruction: String,
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f64,
}

impl NormalizedRequest {
    /// Creates a new request.
    pub fn new(
        text: impl Into<String>,
        system_instruction: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            text: text.into(),
            system_instruction: system_instruction.into(),
            temperature,
        }
    }

    /// Instruction and text joined into one prompt.
    ///
    /// Used by vendors without a separate system channel.
    pub fn combined_prompt(&self) -> String {
        format!("{}\n\n{}", self.system_instruction, self.text)
    }
}
