//! User preferences store.
//!
//! Holds the settings a revision round reads at start-up: temperature,
//! footnote handling, default models, the persistent instruction layer and
//! per-provider endpoint overrides.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use redraft_core::validation::validate_temperature;
use redraft_core::{DEFAULT_TEMPERATURE, DEFAULT_USER_TEMPLATE, ProviderKind};
use redraft_fetch::{FetchSettings, ProviderEndpoint};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_or_recover, save_json};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Keys accepted by [`Settings::set_value`]. Provider keys are prefixed
/// with the provider's CLI name, e.g. `openai.base_url`.
pub const SETTINGS_KEYS: &[&str] = &[
    "temperature",
    "remove_footnotes",
    "default_models",
    "user_template",
    "timeout",
    "<provider>.api_key_env",
    "<provider>.base_url",
];

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sampling temperature for new rounds.
    pub temperature: f64,

    /// Strip footnote markers before submission.
    pub remove_footnotes: bool,

    /// Model ids preselected for a round; empty uses the catalog defaults.
    pub default_models: Vec<String>,

    /// Persistent instruction layer.
    pub persistent_prompt: Option<String>,

    /// Template wrapping the submitted text; `{text}` marks the spot.
    pub user_template: String,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Per-provider settings.
    pub provider_settings: HashMap<ProviderKind, ProviderSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            remove_footnotes: true,
            default_models: Vec::new(),
            persistent_prompt: None,
            user_template: DEFAULT_USER_TEMPLATE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            provider_settings: HashMap::new(),
        }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Environment variable for API key.
    pub api_key_env: Option<String>,

    /// Base URL override.
    pub base_url: Option<String>,
}

fn parse_bool(key: &str, value: &str) -> Result<bool, StoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(StoreError::invalid(key, format!("expected true or false, got '{value}'"))),
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value.to_string())
    }
}

impl Settings {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the transport settings for a fetch context.
    pub fn fetch_settings(&self) -> FetchSettings {
        self.provider_settings.iter().fold(
            FetchSettings::default().with_timeout(self.timeout()),
            |settings, (provider, ps)| {
                settings.with_endpoint(
                    *provider,
                    ProviderEndpoint {
                        api_key: None,
                        api_key_env: ps.api_key_env.clone(),
                        base_url: ps.base_url.clone(),
                    },
                )
            },
        )
    }

    /// Sets one value by key, parsing it from text.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys and unparseable or out-of-range
    /// values; nothing is changed in that case.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match key {
            "temperature" => {
                let temperature: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| StoreError::invalid(key, format!("'{value}' is not a number")))?;
                validate_temperature(temperature)
                    .map_err(|e| StoreError::invalid(key, e.to_string()))?;
                self.temperature = temperature;
            }
            "remove_footnotes" => self.remove_footnotes = parse_bool(key, value)?,
            "default_models" => {
                self.default_models = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }
            "user_template" => {
                if value.trim().is_empty() {
                    return Err(StoreError::invalid(key, "template must not be empty"));
                }
                self.user_template = value.to_string();
            }
            "timeout" => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| StoreError::invalid(key, format!("'{value}' is not a whole number")))?;
                if secs == 0 {
                    return Err(StoreError::invalid(key, "timeout must be at least 1 second"));
                }
                self.request_timeout_secs = secs;
            }
            _ => return self.set_provider_value(key, value),
        }
        Ok(())
    }

    fn set_provider_value(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let Some((provider, field)) = key.split_once('.') else {
            return Err(StoreError::UnknownKey(key.to_string()));
        };
        let provider: ProviderKind = provider
            .parse()
            .map_err(|_| StoreError::UnknownKey(key.to_string()))?;

        let entry = self.provider_settings.entry(provider).or_default();
        match field {
            "api_key_env" => entry.api_key_env = optional(value),
            "base_url" => entry.base_url = optional(value),
            _ => return Err(StoreError::UnknownKey(key.to_string())),
        }

        if entry == &ProviderSettings::default() {
            self.provider_settings.remove(&provider);
        }
        Ok(())
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Persistent settings store.
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings.
    pub fn new(path: PathBuf) -> Self {
        Self::with_settings(path, Settings::default())
    }

    fn with_settings(path: PathBuf, settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Loads settings from the default path.
    ///
    /// # Errors
    ///
    /// Returns error if the settings file exists but cannot be read.
    pub async fn load_default() -> Result<Self, StoreError> {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing file yields defaults; a corrupt file is logged and
    /// replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read.
    pub async fn load(path: PathBuf) -> Result<Self, StoreError> {
        let settings = load_or_recover(&path, "settings").await?;
        debug!(path = %path.display(), "Settings ready");
        Ok(Self::with_settings(path, settings))
    }

    /// Path the store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Updates settings in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        f(&mut *self.settings.write().await);
    }

    /// Sets one value by key; see [`Settings::set_value`].
    ///
    /// # Errors
    ///
    /// Returns an error for unknown keys or invalid values.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.settings.write().await.set_value(key, value)?;
        debug!(key, "Setting changed");
        Ok(())
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    // ========================================================================
    // Convenience Methods
    // ========================================================================

    /// Gets the persistent prompt layer.
    pub async fn persistent_prompt(&self) -> Option<String> {
        self.settings.read().await.persistent_prompt.clone()
    }

    /// Sets the persistent prompt layer.
    pub async fn set_persistent_prompt(&self, prompt: Option<String>) {
        self.update(|s| s.persistent_prompt = prompt).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
