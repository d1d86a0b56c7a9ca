//! Per-target revision state.
//!
//! Holds one panel per output slot, updated from fan-out [`TargetUpdate`]s,
//! with change notifications for observers and an export of the successful
//! outputs.

use std::sync::Arc;

use redraft_core::{ModelTarget, ProviderKind, RevisionBundle, TargetUpdate, TokenUsage};
use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

// ============================================================================
// Panel State
// ============================================================================

/// State of one output slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelState {
    /// Slot id.
    pub target_id: String,
    /// Model label shown for the slot.
    pub label: String,
    /// Vendor.
    pub provider: ProviderKind,
    /// True while the call is in flight.
    pub loading: bool,
    /// Generated text.
    pub content: Option<String>,
    /// Cost of the last successful call.
    pub cost: Option<f64>,
    /// Usage of the last successful call.
    pub tokens: Option<TokenUsage>,
    /// Last error message.
    pub error: Option<String>,
}

impl PanelState {
    fn new(target: &ModelTarget) -> Self {
        Self {
            target_id: target.id.clone(),
            label: target.label().to_string(),
            provider: target.provider(),
            loading: false,
            content: None,
            cost: None,
            tokens: None,
            error: None,
        }
    }

    fn apply(&mut self, update: &TargetUpdate) {
        self.loading = update.loading;
        self.content.clone_from(&update.content);
        self.cost = update.cost;
        self.tokens = update.tokens;
        self.error.clone_from(&update.error);
    }

    /// Returns true if the slot holds a successful output.
    pub fn has_output(&self) -> bool {
        !self.loading && self.error.is_none() && self.content.is_some()
    }
}

// ============================================================================
// Revision Store
// ============================================================================

/// Observable per-slot revision state.
pub struct RevisionStore {
    panels: Arc<RwLock<Vec<PanelState>>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl Default for RevisionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RevisionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            panels: Arc::new(RwLock::new(Vec::new())),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    /// Replaces the panels with one per target, in slot order.
    pub async fn set_targets(&self, targets: &[ModelTarget]) {
        {
            let mut panels = self.panels.write().await;
            *panels = targets.iter().map(PanelState::new).collect();
        }
        self.notify_change().await;
        debug!(count = targets.len(), "Panels configured");
    }

    /// Applies a fan-out update to its panel.
    ///
    /// Updates for unknown slots are ignored.
    pub async fn apply(&self, update: &TargetUpdate) {
        {
            let mut panels = self.panels.write().await;
            let Some(panel) = panels.iter_mut().find(|p| p.target_id == update.target_id) else {
                warn!(target = %update.target_id, "Update for unknown panel");
                return;
            };
            panel.apply(update);
        }
        self.notify_change().await;
    }

    /// Gets one panel.
    pub async fn get(&self, target_id: &str) -> Option<PanelState> {
        self.panels
            .read()
            .await
            .iter()
            .find(|p| p.target_id == target_id)
            .cloned()
    }

    /// Gets all panels in slot order.
    pub async fn panels(&self) -> Vec<PanelState> {
        self.panels.read().await.clone()
    }

    /// Returns true while any panel is loading.
    pub async fn is_busy(&self) -> bool {
        self.panels.read().await.iter().any(|p| p.loading)
    }

    /// Successful outputs in slot order.
    pub async fn export_bundle(&self) -> RevisionBundle {
        let panels = self.panels.read().await;
        let mut bundle = RevisionBundle::new();
        for panel in panels.iter().filter(|p| p.has_output()) {
            if let Some(content) = &panel.content {
                bundle.push(panel.label.clone(), panel.provider, content.clone());
            }
        }
        bundle
    }

    /// Subscribes to state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::{FailureKind, ModelInfo, NormalizedResult};

    fn targets() -> Vec<ModelTarget> {
        vec![
            ModelInfo::new("gpt-4.1", ProviderKind::OpenAi)
                .with_display_name("GPT-4.1")
                .to_target("output-0"),
            ModelInfo::new("claude-sonnet-4-20250514", ProviderKind::Anthropic)
                .with_display_name("Claude Sonnet 4")
                .to_target("output-1"),
            ModelInfo::new("gemini-2.5-pro", ProviderKind::Gemini)
                .with_display_name("Gemini 2.5 Pro")
                .to_target("output-2"),
        ]
    }

    #[tokio::test]
    async fn test_round_lifecycle() {
        let store = RevisionStore::new();
        store.set_targets(&targets()).await;

        for target in targets() {
            store.apply(&TargetUpdate::loading(target.id)).await;
        }
        assert!(store.is_busy().await);

        let ok = NormalizedResult::success(
            "output-2",
            ProviderKind::Gemini,
            "Gemini text",
            TokenUsage::reported(10, 5),
            0.001,
        );
        let failed = NormalizedResult::failure(
            "output-1",
            ProviderKind::Anthropic,
            FailureKind::RateLimit,
            "Rate limited: slow down",
        );
        let ok_first = NormalizedResult::success(
            "output-0",
            ProviderKind::OpenAi,
            "GPT text",
            TokenUsage::reported(10, 5),
            0.002,
        );
        store.apply(&TargetUpdate::finished(&ok)).await;
        store.apply(&TargetUpdate::finished(&failed)).await;
        assert!(store.is_busy().await);
        store.apply(&TargetUpdate::finished(&ok_first)).await;
        assert!(!store.is_busy().await);

        let panel = store.get("output-1").await.unwrap();
        assert_eq!(panel.error.as_deref(), Some("Rate limited: slow down"));
        assert!(!panel.has_output());

        let bundle = store.export_bundle().await;
        let labels: Vec<_> = bundle.sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["GPT-4.1", "Gemini 2.5 Pro"]);
    }

    #[tokio::test]
    async fn test_loading_clears_previous_output() {
        let store = RevisionStore::new();
        store.set_targets(&targets()).await;

        let ok = NormalizedResult::success(
            "output-0",
            ProviderKind::OpenAi,
            "old",
            TokenUsage::reported(1, 1),
            0.0,
        );
        store.apply(&TargetUpdate::finished(&ok)).await;
        store.apply(&TargetUpdate::loading("output-0")).await;

        let panel = store.get("output-0").await.unwrap();
        assert!(panel.loading);
        assert_eq!(panel.content, None);
        assert!(store.export_bundle().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_slot_ignored_without_notification() {
        let store = RevisionStore::new();
        store.set_targets(&targets()).await;
        let mut rx = store.subscribe();
        let _ = rx.borrow_and_update();

        store.apply(&TargetUpdate::loading("output-9")).await;

        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.panels().await.len(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_update() {
        let store = RevisionStore::new();
        let mut rx = store.subscribe();

        store.set_targets(&targets()).await;
        store.apply(&TargetUpdate::loading("output-0")).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), 2);
    }
}
