//! The provider adapter seam.
//!
//! Each vendor implements [`ProviderAdapter`]. The fan-out picks the adapter
//! by [`ProviderKind`] and never looks at vendor wire formats itself.

use std::borrow::Cow;

use async_trait::async_trait;
use redraft_core::{ModelTarget, NormalizedRequest, ProviderKind, RawUsage};

use crate::context::FetchContext;
use crate::error::ProviderError;

// ============================================================================
// Raw Completion
// ============================================================================

/// What an adapter extracted from a vendor response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion {
    /// First text-bearing content item.
    pub text: String,
    /// Usage block, if the vendor sent one.
    pub usage: Option<RawUsage>,
}

impl RawCompletion {
    /// Creates a completion with reported usage.
    pub fn new(text: impl Into<String>, usage: Option<RawUsage>) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }

    /// Creates a completion without usage data.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }
}

// ============================================================================
// Provider Adapter Trait
// ============================================================================

/// Translates a normalized request into one vendor call.
///
/// Implementations make exactly one outbound request per call and never
/// retry. Every failure is reported as a [`ProviderError`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// The vendor this adapter speaks to.
    fn kind(&self) -> ProviderKind;

    /// Sends `request` to the model configured on `target`.
    async fn invoke(
        &self,
        ctx: &FetchContext,
        target: &ModelTarget,
        request: &NormalizedRequest,
    ) -> Result<RawCompletion, ProviderError>;

    /// The input text the vendor received for `request`.
    ///
    /// Token estimation counts this when the vendor reports no usage. The
    /// default is the user message alone; adapters that fold the instruction
    /// into the prompt return the combined text.
    fn sent_input<'a>(&self, _target: &ModelTarget, request: &'a NormalizedRequest) -> Cow<'a, str> {
        Cow::Borrowed(&request.text)
    }
}
