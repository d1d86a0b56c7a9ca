//! Prompt layer store.
//!
//! The persistent layer lives in the settings file and the session layer in
//! the session file. The current layer belongs to a single submission and is
//! never stored.

use std::sync::Arc;

use redraft_core::{DEFAULT_SYSTEM_MESSAGE, PromptLayer, PromptLayers};
use tracing::info;

use crate::error::StoreError;
use crate::session_store::SessionStore;
use crate::settings_store::SettingsStore;

/// An instruction together with the layer that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectivePrompt {
    /// Instruction text.
    pub text: String,
    /// Supplying layer.
    pub layer: PromptLayer,
}

/// Reads and writes the stored prompt layers.
#[derive(Clone)]
pub struct PromptStore {
    settings: Arc<SettingsStore>,
    session: Arc<SessionStore>,
}

impl PromptStore {
    /// Creates a prompt store over the settings and session stores.
    pub fn new(settings: Arc<SettingsStore>, session: Arc<SessionStore>) -> Self {
        Self { settings, session }
    }

    /// Stored layers; `current` is always empty.
    pub async fn layers(&self) -> PromptLayers {
        PromptLayers {
            current: None,
            session: self.session.session_prompt().await,
            persistent: self.settings.persistent_prompt().await,
        }
    }

    /// Resolves the instruction for a submission carrying `current`.
    pub async fn resolve(&self, current: Option<&str>) -> EffectivePrompt {
        let mut layers = self.layers().await;
        if let Some(current) = current {
            layers.set_current(current);
        }
        let resolved = layers.resolve_with_layer(DEFAULT_SYSTEM_MESSAGE);
        EffectivePrompt {
            text: resolved.text.to_string(),
            layer: resolved.layer,
        }
    }

    /// Sets a stored layer and saves both files.
    ///
    /// Setting the persistent layer clears the session layer.
    ///
    /// # Errors
    ///
    /// Fails for the `current` and `default` layers, or if saving fails.
    pub async fn set(&self, layer: PromptLayer, prompt: &str) -> Result<(), StoreError> {
        if layer == PromptLayer::Current {
            return Err(StoreError::Config(
                "the current prompt applies to one submission; pass it with the revision".to_string(),
            ));
        }
        let mut layers = self.layers().await;
        layers.set(layer, prompt)?;
        self.store(layers).await?;
        info!(layer = %layer, "Prompt layer set");
        Ok(())
    }

    /// Clears a stored layer and saves both files.
    ///
    /// # Errors
    ///
    /// Returns error if saving fails.
    pub async fn clear(&self, layer: PromptLayer) -> Result<(), StoreError> {
        let mut layers = self.layers().await;
        layers.clear(layer);
        self.store(layers).await?;
        info!(layer = %layer, "Prompt layer cleared");
        Ok(())
    }

    async fn store(&self, layers: PromptLayers) -> Result<(), StoreError> {
        self.settings.set_persistent_prompt(layers.persistent).await;
        self.session.set_session_prompt(layers.session).await;
        self.settings.save().await?;
        self.session.save().await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stores(dir: &tempfile::TempDir) -> (Arc<SettingsStore>, Arc<SessionStore>, PromptStore) {
        let settings = Arc::new(SettingsStore::new(dir.path().join("settings.json")));
        let session = Arc::new(SessionStore::new(dir.path().join("session.json")));
        let prompts = PromptStore::new(Arc::clone(&settings), Arc::clone(&session));
        (settings, session, prompts)
    }

    #[tokio::test]
    async fn test_default_when_nothing_stored() {
        let dir = tempfile::tempdir().unwrap();
        let (_, _, prompts) = stores(&dir);

        let effective = prompts.resolve(None).await;
        assert_eq!(effective.layer, PromptLayer::Default);
        assert_eq!(effective.text, DEFAULT_SYSTEM_MESSAGE);
    }

    #[tokio::test]
    async fn test_precedence_and_clearing() {
        let dir = tempfile::tempdir().unwrap();
        let (settings, session, prompts) = stores(&dir);

        prompts.set(PromptLayer::Persistent, "P").await.unwrap();
        assert_eq!(prompts.resolve(None).await.layer, PromptLayer::Persistent);

        prompts.set(PromptLayer::Session, "S").await.unwrap();
        assert_eq!(prompts.resolve(None).await.text, "S");

        let effective = prompts.resolve(Some("C")).await;
        assert_eq!(effective.text, "C");
        assert_eq!(effective.layer, PromptLayer::Current);

        // Whitespace-only current falls through.
        assert_eq!(prompts.resolve(Some("   ")).await.text, "S");

        // A new persistent prompt drops the session layer.
        prompts.set(PromptLayer::Persistent, "P2").await.unwrap();
        assert_eq!(session.session_prompt().await, None);
        assert_eq!(prompts.resolve(None).await.text, "P2");
        assert_eq!(settings.persistent_prompt().await.as_deref(), Some("P2"));
    }

    #[tokio::test]
    async fn test_changes_are_saved() {
        let dir = tempfile::tempdir().unwrap();
        let (_, _, prompts) = stores(&dir);
        prompts.set(PromptLayer::Persistent, "Saved").await.unwrap();
        prompts.set(PromptLayer::Session, "Also saved").await.unwrap();

        let settings = Arc::new(SettingsStore::load(dir.path().join("settings.json")).await.unwrap());
        let session = Arc::new(SessionStore::load(dir.path().join("session.json")).await.unwrap());
        let reloaded = PromptStore::new(settings, session);

        let layers = reloaded.layers().await;
        assert_eq!(layers.persistent.as_deref(), Some("Saved"));
        assert_eq!(layers.session.as_deref(), Some("Also saved"));

        reloaded.clear(PromptLayer::Session).await.unwrap();
        assert_eq!(reloaded.resolve(None).await.text, "Saved");
    }

    #[tokio::test]
    async fn test_rejects_unstorable_layers() {
        let dir = tempfile::tempdir().unwrap();
        let (_, _, prompts) = stores(&dir);
        assert!(prompts.set(PromptLayer::Current, "x").await.is_err());
        assert!(prompts.set(PromptLayer::Default, "x").await.is_err());
    }
}
