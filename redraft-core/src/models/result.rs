//! Per-target results and progress updates.
//!
//! This module contains:
//! - [`NormalizedResult`] - Final outcome of one target in a round
//! - [`FailureKind`] - Stable tag for per-target failures
//! - [`TargetUpdate`] - Progress notification streamed to callers
//! - [`RevisionBundle`] - Successful outputs collected for export

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::ProviderKind;
use super::usage::TokenUsage;

// ============================================================================
// Failure Kind
// ============================================================================

/// Category of a per-target failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing, invalid or rejected credentials.
    Auth,
    /// Vendor throttled the request.
    RateLimit,
    /// Vendor answered with an error or an unusable body.
    Response,
    /// The request never got a response.
    Network,
}

impl FailureKind {
    /// Stable tag used in logs and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Response => "response",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Normalized Result
// ============================================================================

/// Outcome of a single target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The vendor produced text.
    Success {
        /// Generated text.
        content: String,
        /// Normalized token usage.
        usage: TokenUsage,
        /// Cost in USD at the target's rates.
        cost: f64,
    },
    /// The call failed.
    Failure {
        /// Failure category.
        kind: FailureKind,
        /// Human-readable message.
        message: String,
    },
}

/// Exactly one per target per round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Slot id.
    pub target_id: String,
    /// Vendor that served the target.
    pub provider: ProviderKind,
    /// What happened.
    pub outcome: Outcome,
}

impl NormalizedResult {
    /// Creates a successful result.
    pub fn success(
        target_id: impl Into<String>,
        provider: ProviderKind,
        content: impl Into<String>,
        usage: TokenUsage,
        cost: f64,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            provider,
            outcome: Outcome::Success {
                content: content.into(),
                usage,
                cost,
            },
        }
    }

    /// Creates a failed result.
    pub fn failure(
        target_id: impl Into<String>,
        provider: ProviderKind,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            provider,
            outcome: Outcome::Failure {
                kind,
                message: message.into(),
            },
        }
    }

    /// Returns true if the target succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Generated text, if any.
    pub fn content(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success { content, .. } => Some(content),
            Outcome::Failure { .. } => None,
        }
    }

    /// Normalized usage, if the target succeeded.
    pub fn usage(&self) -> Option<TokenUsage> {
        match &self.outcome {
            Outcome::Success { usage, .. } => Some(*usage),
            Outcome::Failure { .. } => None,
        }
    }

    /// Cost in USD; zero for failures.
    pub fn cost(&self) -> f64 {
        match &self.outcome {
            Outcome::Success { cost, .. } => *cost,
            Outcome::Failure { .. } => 0.0,
        }
    }

    /// Failure category, if the target failed.
    pub fn error_kind(&self) -> Option<FailureKind> {
        match &self.outcome {
            Outcome::Failure { kind, .. } => Some(*kind),
            Outcome::Success { .. } => None,
        }
    }

    /// Failure message, if the target failed.
    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failure { message, .. } => Some(message),
            Outcome::Success { .. } => None,
        }
    }
}

// ============================================================================
// Target Update
// ============================================================================

/// Progress notification for one target.
///
/// A round emits a `loading` update for every target before anything else,
/// then one finished update per target in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetUpdate {
    /// Slot id.
    pub target_id: String,
    /// True while the call is in flight.
    pub loading: bool,
    /// Generated text on success.
    pub content: Option<String>,
    /// Cost on success.
    pub cost: Option<f64>,
    /// Token usage on success.
    pub tokens: Option<TokenUsage>,
    /// Error message on failure.
    pub error: Option<String>,
}

impl TargetUpdate {
    /// Marks a target as in flight and clears its previous output.
    pub fn loading(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            loading: true,
            content: None,
            cost: None,
            tokens: None,
            error: None,
        }
    }

    /// Builds the finished update for a result.
    pub fn finished(result: &NormalizedResult) -> Self {
        match &result.outcome {
            Outcome::Success {
                content,
                usage,
                cost,
            } => Self {
                target_id: result.target_id.clone(),
                loading: false,
                content: Some(content.clone()),
                cost: Some(*cost),
                tokens: Some(*usage),
                error: None,
            },
            Outcome::Failure { message, .. } => Self {
                target_id: result.target_id.clone(),
                loading: false,
                content: None,
                cost: None,
                tokens: None,
                error: Some(message.clone()),
            },
        }
    }
}

// ============================================================================
// Revision Bundle
// ============================================================================

/// One successful output in an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionSection {
    /// Model label.
    pub label: String,
    /// Vendor.
    pub provider: ProviderKind,
    /// Generated text.
    pub content: String,
}

/// Ordered collection of successful outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionBundle {
    /// When the bundle was assembled.
    pub created_at: DateTime<Utc>,
    /// Sections in slot order.
    pub sections: Vec<RevisionSection>,
}

impl RevisionBundle {
    /// Creates an empty bundle stamped now.
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            sections: Vec::new(),
        }
    }

    /// Appends a section.
    pub fn push(&mut self, label: impl Into<String>, provider: ProviderKind, content: impl Into<String>) {
        self.sections.push(RevisionSection {
            label: label.into(),
            provider,
            content: content.into(),
        });
    }

    /// Returns true if there is nothing to export.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Default export filename (`output-YYYYmmddHHMMSS.txt`).
    pub fn default_filename(&self) -> String {
        format!("output-{}.txt", self.created_at.format("%Y%m%d%H%M%S"))
    }
}

impl Default for RevisionBundle {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_success_accessors() {
        let result = NormalizedResult::success(
            "output-0",
            ProviderKind::OpenAi,
            "Revised.",
            TokenUsage::reported(10, 5),
            0.001,
        );
        assert!(result.is_success());
        assert_eq!(result.content(), Some("Revised."));
        assert_eq!(result.usage().map(|u| u.total()), Some(15));
        assert!((result.cost() - 0.001).abs() < f64::EPSILON);
        assert_eq!(result.error_kind(), None);
        assert_eq!(result.error_message(), None);
    }

    #[test]
    fn test_failure_accessors() {
        let result = NormalizedResult::failure(
            "output-1",
            ProviderKind::Gemini,
            FailureKind::RateLimit,
            "Too many requests",
        );
        assert!(!result.is_success());
        assert_eq!(result.content(), None);
        assert_eq!(result.usage(), None);
        assert!(result.cost().abs() < f64::EPSILON);
        assert_eq!(result.error_kind(), Some(FailureKind::RateLimit));
        assert_eq!(result.error_message(), Some("Too many requests"));
    }

    #[test]
    fn test_finished_update_from_failure() {
        let result =
            NormalizedResult::failure("output-2", ProviderKind::Anthropic, FailureKind::Auth, "bad key");
        let update = TargetUpdate::finished(&result);
        assert!(!update.loading);
        assert_eq!(update.error.as_deref(), Some("bad key"));
        assert!(update.content.is_none());
        assert!(update.cost.is_none());
    }

    #[test]
    fn test_loading_update_clears_fields() {
        let update = TargetUpdate::loading("output-0");
        assert!(update.loading);
        assert!(update.content.is_none());
        assert!(update.error.is_none());
    }

    #[test]
    fn test_failure_kind_tags() {
        assert_eq!(FailureKind::RateLimit.to_string(), "rate_limit");
        assert_eq!(
            serde_json::to_string(&FailureKind::RateLimit).unwrap(),
            r#""rate_limit""#
        );
    }

    #[test]
    fn test_bundle_filename() {
        let mut bundle = RevisionBundle::new();
        bundle.created_at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 7).unwrap();
        assert!(bundle.is_empty());
        bundle.push("GPT-4.1", ProviderKind::OpenAi, "text");
        assert!(!bundle.is_empty());
        assert_eq!(bundle.default_filename(), "output-20250309140507.txt");
    }
}
