//! Model catalog.
//!
//! The catalog maps model ids to [`ModelInfo`] (vendor, wire name, pricing,
//! caps) and lists the models preselected for a new round. A built-in table
//! ships with the crate; a `models.yaml` file can add or override entries.
//!
//! ## File format
//!
//! ```yaml
//! models:
//!   claude-sonnet-4:
//!     name: Claude Sonnet 4
//!     provider: anthropic
//!     api_model: claude-sonnet-4-20250514
//!     input_cost: 3.0
//!     output_cost: 15.0
//!     max_tokens: 64000
//!     context_window: 200000
//! default_models:
//!   - claude-sonnet-4
//! ```
//!
//! `provider` may be omitted when the wire name identifies the vendor.
//! `output_cost_regular` is accepted in place of `output_cost`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use redraft_core::{ModelInfo, ModelTarget, ProviderKind, ValidationError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

// ============================================================================
// Errors
// ============================================================================

/// Errors loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// File is not valid YAML for the catalog schema.
    #[error("Invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An entry is inconsistent.
    #[error("Invalid catalog entry: {0}")]
    Invalid(String),
}

// ============================================================================
// File Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    models: serde_yaml::Mapping,
    #[serde(default)]
    default_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: Option<String>,
    provider: Option<String>,
    api_model: Option<String>,
    #[serde(default)]
    input_cost: f64,
    output_cost: Option<f64>,
    output_cost_regular: Option<f64>,
    max_tokens: Option<u32>,
    context_window: Option<u32>,
}

impl ModelEntry {
    fn into_model(self, id: String) -> Result<ModelInfo, CatalogError> {
        let api_model = self.api_model.unwrap_or_else(|| id.clone());

        let provider = match self.provider.as_deref() {
            Some(name) => ProviderKind::from_str(name)
                .map_err(|_| CatalogError::Invalid(format!("{id}: unknown provider '{name}'")))?,
            None => ProviderKind::from_model_name(&api_model).ok_or_else(|| {
                CatalogError::Invalid(format!("{id}: provider missing and not inferable"))
            })?,
        };

        let output_cost = self.output_cost.or(self.output_cost_regular).unwrap_or(0.0);
        for price in [self.input_cost, output_cost] {
            if !price.is_finite() || price < 0.0 {
                return Err(CatalogError::Invalid(format!("{id}: invalid price {price}")));
            }
        }

        let mut model = ModelInfo::new(id.clone(), provider)
            .with_display_name(self.name.unwrap_or(id))
            .with_api_model(api_model)
            .with_pricing(self.input_cost, output_cost);
        model.max_output_tokens = self.max_tokens;
        model.context_window = self.context_window;
        Ok(model)
    }
}

// ============================================================================
// Built-in Models
// ============================================================================

fn builtin_model(
    id: &str,
    name: &str,
    provider: ProviderKind,
    pricing: (f64, f64),
    max_output: u32,
    context: u32,
) -> ModelInfo {
    ModelInfo::new(id, provider)
        .with_display_name(name)
        .with_pricing(pricing.0, pricing.1)
        .with_max_output_tokens(max_output)
        .with_context_window(context)
}

fn builtin_models() -> Vec<ModelInfo> {
    use ProviderKind::{Anthropic, Gemini, OpenAi};

    vec![
        builtin_model("claude-opus-4-20250514", "Claude Opus 4", Anthropic, (15.0, 75.0), 32_000, 200_000),
        builtin_model("claude-sonnet-4-20250514", "Claude Sonnet 4", Anthropic, (3.0, 15.0), 64_000, 200_000),
        builtin_model("claude-3-7-sonnet-20250219", "Claude 3.7 Sonnet", Anthropic, (3.0, 15.0), 64_000, 200_000),
        builtin_model("gpt-4.1", "GPT-4.1", OpenAi, (2.0, 8.0), 32_768, 1_000_000),
        builtin_model("gpt-4.1-mini", "GPT-4.1 mini", OpenAi, (0.4, 1.6), 32_768, 1_000_000),
        builtin_model("gpt-4.1-nano", "GPT-4.1 nano", OpenAi, (0.1, 0.4), 32_768, 1_000_000),
        builtin_model("gpt-4.5-preview", "GPT-4.5 Preview", OpenAi, (75.0, 150.0), 32_768, 256_000),
        builtin_model("o3-mini", "o3-mini", OpenAi, (1.0, 4.0), 100_000, 200_000),
        builtin_model("o4-mini-high", "o4-mini (high)", OpenAi, (1.0, 4.0), 100_000, 200_000)
            .with_api_model("o4-mini"),
        builtin_model("gemini-2.5-pro", "Gemini 2.5 Pro", Gemini, (1.25, 10.0), 8192, 1_000_000),
        builtin_model("gemini-2.5-flash", "Gemini 2.5 Flash", Gemini, (0.5, 2.0), 8192, 1_000_000),
    ]
}

const BUILTIN_DEFAULTS: &[&str] = &["claude-sonnet-4-20250514", "gpt-4.1", "gemini-2.5-pro"];

/// Slot id for the target at `index`.
pub fn target_slot_id(index: usize) -> String {
    format!("output-{index}")
}

// ============================================================================
// Model Catalog
// ============================================================================

/// Known models and the default selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
    default_models: Vec<String>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCatalog {
    /// The catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            models: builtin_models(),
            default_models: BUILTIN_DEFAULTS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Parses a catalog from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(yaml)?;

        let mut models = Vec::with_capacity(file.models.len());
        for (key, value) in file.models {
            let id = key
                .as_str()
                .ok_or_else(|| CatalogError::Invalid("model ids must be strings".to_string()))?
                .to_string();
            let entry: ModelEntry = serde_yaml::from_value(value)?;
            models.push(entry.into_model(id)?);
        }

        let catalog = Self {
            models,
            default_models: file.default_models,
        };
        catalog.check_defaults()?;
        Ok(catalog)
    }

    /// Reads and parses a catalog file.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_yaml_str(&yaml)?;
        info!(path = %path.display(), models = catalog.models.len(), "Loaded model catalog");
        Ok(catalog)
    }

    /// Built-in catalog overlaid with `path`, if the file exists.
    pub async fn load_with_overrides(path: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin();
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            catalog.merge(Self::load(path).await?);
        } else {
            debug!(path = %path.display(), "No catalog file, using built-in models");
        }
        Ok(catalog)
    }

    /// Adds or replaces models from `other`.
    ///
    /// A non-empty default list in `other` replaces this one.
    pub fn merge(&mut self, other: Self) {
        for model in other.models {
            match self.models.iter_mut().find(|m| m.id == model.id) {
                Some(existing) => *existing = model,
                None => self.models.push(model),
            }
        }
        if !other.default_models.is_empty() {
            self.default_models = other.default_models;
        }
    }

    fn check_defaults(&self) -> Result<(), CatalogError> {
        match self.default_models.iter().find(|id| self.get(id).is_none()) {
            Some(missing) => Err(CatalogError::Invalid(format!(
                "default model '{missing}' is not defined"
            ))),
            None => Ok(()),
        }
    }

    /// Looks up a model by id, then by wire name.
    pub fn get(&self, id: &str) -> Option<&ModelInfo> {
        self.models
            .iter()
            .find(|m| m.id == id)
            .or_else(|| self.models.iter().find(|m| m.api_model == id))
    }

    /// Looks up a model, failing with a validation error.
    pub fn require(&self, id: &str) -> Result<&ModelInfo, ValidationError> {
        self.get(id)
            .ok_or_else(|| ValidationError::UnknownModel(id.to_string()))
    }

    /// All models in catalog order.
    pub fn all(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Models served by `provider`.
    pub fn by_provider(&self, provider: ProviderKind) -> Vec<&ModelInfo> {
        self.models.iter().filter(|m| m.provider == provider).collect()
    }

    /// Ids preselected for a new round.
    pub fn default_models(&self) -> &[String] {
        &self.default_models
    }

    /// Binds `ids` to slots `output-0`, `output-1`, ...
    pub fn targets<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<ModelTarget>, ValidationError> {
        ids.iter()
            .enumerate()
            .map(|(index, id)| Ok(self.require(id.as_ref())?.to_target(target_slot_id(index))))
            .collect()
    }

    /// Targets for the default selection.
    pub fn default_targets(&self) -> Result<Vec<ModelTarget>, ValidationError> {
        self.targets(&self.default_models)
    }
}

// ============================================================================
// Tests
// ============================================================================
