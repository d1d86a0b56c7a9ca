//! CLI command implementations.

pub mod config;
pub mod estimate;
pub mod models;
pub mod prompt;
pub mod revise;
pub mod session;

use std::path::Path;

use anyhow::{Context, Result};
use redraft_core::ModelTarget;
use redraft_providers::ModelCatalog;
use redraft_store::{Settings, default_catalog_path};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Reads the text to revise from the argument, a file, or stdin.
pub async fn read_input(text: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text.to_string());
    }

    if let Some(path) = file {
        debug!(path = %path.display(), "Reading input file");
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    debug!("Reading input from stdin");
    let mut buf = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buf)
        .await
        .context("Failed to read stdin")?;
    Ok(buf)
}

/// Loads the built-in catalog merged with the user's overrides.
pub async fn load_catalog() -> Result<ModelCatalog> {
    let path = default_catalog_path();
    ModelCatalog::load_with_overrides(&path)
        .await
        .with_context(|| format!("Failed to load model catalog from {}", path.display()))
}

/// Picks the targets for a round.
///
/// Explicit model ids win, then the ids saved in settings, then the catalog
/// defaults.
pub fn select_targets(
    catalog: &ModelCatalog,
    requested: &[String],
    settings: &Settings,
) -> Result<Vec<ModelTarget>> {
    let targets = if !requested.is_empty() {
        catalog.targets(requested)?
    } else if !settings.default_models.is_empty() {
        catalog.targets(&settings.default_models)?
    } else {
        catalog.default_targets()?
    };
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::ValidationError;

    #[test]
    fn test_select_targets_precedence() {
        let catalog = ModelCatalog::builtin();
        let mut settings = Settings::default();

        let defaults = select_targets(&catalog, &[], &settings).unwrap();
        assert_eq!(defaults.len(), catalog.default_models().len());
        assert_eq!(defaults[0].id, "output-0");

        settings.default_models = vec!["gpt-4.1-mini".to_string()];
        let saved = select_targets(&catalog, &[], &settings).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].model.id, "gpt-4.1-mini");

        let explicit =
            select_targets(&catalog, &["gemini-2.5-flash".to_string()], &settings).unwrap();
        assert_eq!(explicit[0].model.id, "gemini-2.5-flash");
    }

    #[test]
    fn test_select_targets_unknown_model() {
        let catalog = ModelCatalog::builtin();
        let err = select_targets(&catalog, &["gpt-9".to_string()], &Settings::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::UnknownModel("gpt-9".to_string()))
        );
    }

    #[tokio::test]
    async fn test_read_input_prefers_argument() {
        let text = read_input(Some("inline"), Some(Path::new("/nonexistent"))).await.unwrap();
        assert_eq!(text, "inline");
    }

    #[tokio::test]
    async fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.txt");
        tokio::fs::write(&path, "from file").await.unwrap();

        let text = read_input(None, Some(&path)).await.unwrap();
        assert_eq!(text, "from file");

        let missing = read_input(None, Some(&dir.path().join("missing.txt"))).await;
        assert!(missing.is_err());
    }
}
