//! Layered system-instruction overrides.
//!
//! Three optional layers sit above a built-in default. The first non-empty
//! layer in the order `current`, `session`, `persistent` wins:
//!
//! - `current` applies to the next round only
//! - `session` lasts until the session is reset
//! - `persistent` survives sessions
//!
//! Setting a broader layer clears the narrower ones beneath it, so a fresh
//! persistent prompt is not shadowed by a stale session prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ============================================================================
// Prompt Layer
// ============================================================================

/// Identifies where a resolved instruction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLayer {
    /// Single-use override for the next round.
    Current,
    /// Session override.
    Session,
    /// Saved override.
    Persistent,
    /// Built-in instruction.
    Default,
}

impl PromptLayer {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Session => "session",
            Self::Persistent => "persistent",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for PromptLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptLayer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" | "once" => Ok(Self::Current),
            "session" => Ok(Self::Session),
            "persistent" | "saved" => Ok(Self::Persistent),
            "default" => Ok(Self::Default),
            other => Err(CoreError::InvalidConfig(format!("unknown prompt layer: {other}"))),
        }
    }
}

// ============================================================================
// Prompt Layers
// ============================================================================

/// The three override layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptLayers {
    /// Single-use override.
    pub current: Option<String>,
    /// Session override.
    pub session: Option<String>,
    /// Saved override.
    pub persistent: Option<String>,
}

/// A resolved instruction and the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt<'a> {
    /// The instruction text.
    pub text: &'a str,
    /// The layer it came from.
    pub layer: PromptLayer,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

impl PromptLayers {
    /// Creates empty layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the effective instruction.
    pub fn resolve<'a>(&'a self, default: &'a str) -> &'a str {
        self.resolve_with_layer(default).text
    }

    /// Returns the effective instruction and the layer that supplied it.
    pub fn resolve_with_layer<'a>(&'a self, default: &'a str) -> ResolvedPrompt<'a> {
        if let Some(text) = non_empty(self.current.as_ref()) {
            return ResolvedPrompt {
                text,
                layer: PromptLayer::Current,
            };
        }
        if let Some(text) = non_empty(self.session.as_ref()) {
            return ResolvedPrompt {
                text,
                layer: PromptLayer::Session,
            };
        }
        if let Some(text) = non_empty(self.persistent.as_ref()) {
            return ResolvedPrompt {
                text,
                layer: PromptLayer::Persistent,
            };
        }
        ResolvedPrompt {
            text: default,
            layer: PromptLayer::Default,
        }
    }

    /// Sets the single-use override. Other layers are untouched.
    pub fn set_current(&mut self, prompt: impl Into<String>) {
        self.current = Some(prompt.into());
    }

    /// Sets the session override and clears `current`.
    pub fn set_session(&mut self, prompt: impl Into<String>) {
        self.session = Some(prompt.into());
        self.current = None;
    }

    /// Sets the saved override and clears `session` and `current`.
    pub fn set_persistent(&mut self, prompt: impl Into<String>) {
        self.persistent = Some(prompt.into());
        self.session = None;
        self.current = None;
    }

    /// Sets a layer by name.
    ///
    /// Setting [`PromptLayer::Default`] is rejected; the default is built in.
    pub fn set(&mut self, layer: PromptLayer, prompt: impl Into<String>) -> Result<(), CoreError> {
        match layer {
            PromptLayer::Current => self.set_current(prompt),
            PromptLayer::Session => self.set_session(prompt),
            PromptLayer::Persistent => self.set_persistent(prompt),
            PromptLayer::Default => {
                return Err(CoreError::InvalidConfig(
                    "the default prompt cannot be overridden".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Clears a single layer. Clearing the default is a no-op.
    pub fn clear(&mut self, layer: PromptLayer) {
        match layer {
            PromptLayer::Current => self.current = None,
            PromptLayer::Session => self.session = None,
            PromptLayer::Persistent => self.persistent = None,
            PromptLayer::Default => {}
        }
    }

    /// Discards the single-use override. Called after every round.
    pub fn consume_current(&mut self) -> Option<String> {
        self.current.take()
    }

    /// Returns the raw value of a layer.
    pub fn get(&self, layer: PromptLayer) -> Option<&str> {
        match layer {
            PromptLayer::Current => self.current.as_deref(),
            PromptLayer::Session => self.session.as_deref(),
            PromptLayer::Persistent => self.persistent.as_deref(),
            PromptLayer::Default => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
