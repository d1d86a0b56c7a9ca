//! Config command - manage configuration and API keys.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use redraft_core::ProviderKind;
use redraft_fetch::host::keychain::{accounts, services};
use redraft_fetch::{KeychainApi, SystemKeychain};
use redraft_providers::{ProviderDescriptor, ProviderRegistry};
use redraft_store::{
    SETTINGS_KEYS, Settings, SettingsStore, default_cache_dir, default_catalog_path,
    default_config_dir, default_session_path, default_settings_path,
};
use serde::Serialize;
use tracing::info;

use super::read_input;
use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Change one setting.
    Set {
        /// Setting name, e.g. temperature or openai.base_url.
        key: String,
        /// New value; "none" clears optional values.
        value: String,
    },

    /// List the setting names accepted by `config set`.
    Keys,

    /// Manage API keys in the system keychain.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

/// Keychain subcommands.
#[derive(Subcommand)]
pub enum KeyAction {
    /// Store an API key. Read from stdin when omitted.
    Set {
        /// Provider (openai, anthropic, gemini).
        provider: String,
        /// The key.
        key: Option<String>,
    },

    /// Remove a stored API key.
    Remove {
        /// Provider (openai, anthropic, gemini).
        provider: String,
    },

    /// Show where each provider's key would come from.
    Status {
        /// Only this provider.
        provider: Option<String>,
    },
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<ExitCode> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await?,
        ConfigAction::Path => show_paths(cli)?,
        ConfigAction::Set { key, value } => set_value(key, value, cli).await?,
        ConfigAction::Keys => {
            for key in SETTINGS_KEYS {
                println!("{key}");
            }
        }
        ConfigAction::Key { action } => run_key(action, cli).await?,
    }
    Ok(ExitCode::Success)
}

fn provider_by_name(name: &str) -> Result<&'static ProviderDescriptor> {
    ProviderRegistry::get_by_cli_name(name)
        .ok_or_else(|| anyhow::anyhow!("Unknown provider: {name}"))
}

// ============================================================================
// Settings
// ============================================================================

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;

    match cli.format {
        OutputFormat::Text => print_settings(&settings),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&settings)?);
        }
    }

    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("Redraft Configuration");
    println!("{}", "─".repeat(40));
    println!();
    println!("Temperature:      {}", settings.temperature);
    println!("Remove footnotes: {}", settings.remove_footnotes);
    println!("Timeout:          {}s", settings.request_timeout_secs);
    if settings.default_models.is_empty() {
        println!("Default models:   (catalog defaults)");
    } else {
        println!("Default models:   {}", settings.default_models.join(", "));
    }
    println!(
        "Saved prompt:     {}",
        if settings.persistent_prompt.is_some() { "set" } else { "not set" }
    );
    println!();
    println!("User template:");
    println!("  {}", settings.user_template.replace('\n', "\n  "));

    for provider in ProviderKind::all() {
        let Some(ps) = settings.provider_settings.get(provider) else {
            continue;
        };
        println!();
        println!("{}:", provider.display_name());
        if let Some(env) = &ps.api_key_env {
            println!("  API key env: {env}");
        }
        if let Some(url) = &ps.base_url {
            println!("  Base URL:    {url}");
        }
    }
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_dir = default_config_dir();
    let settings_path = default_settings_path();
    let catalog_path = default_catalog_path();
    let cache_dir = default_cache_dir();
    let session_path = default_session_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:    {}", config_dir.display());
            println!("Settings file: {}", settings_path.display());
            println!("Model catalog: {}", catalog_path.display());
            println!("Cache dir:     {}", cache_dir.display());
            println!("Session file:  {}", session_path.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": settings_path.display().to_string(),
                "catalog_file": catalog_path.display().to_string(),
                "cache_dir": cache_dir.display().to_string(),
                "session_file": session_path.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

async fn set_value(key: &str, value: &str, cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    store.set_value(key, value).await?;
    store.save().await?;

    info!(key = %key, "Setting updated");
    if !cli.quiet {
        println!("{key} updated");
    }
    Ok(())
}

// ============================================================================
// API Keys
// ============================================================================

/// Where a provider's API key would come from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatus {
    provider: &'static str,
    env_var: String,
    env_set: bool,
    keychain_set: bool,
    endpoint: String,
}

impl KeyStatus {
    fn source(&self) -> &'static str {
        if self.env_set {
            "environment"
        } else if self.keychain_set {
            "keychain"
        } else {
            "missing"
        }
    }
}

async fn run_key(action: &KeyAction, cli: &Cli) -> Result<()> {
    let keychain = SystemKeychain::new();

    match action {
        KeyAction::Set { provider, key } => {
            let desc = provider_by_name(provider)?;
            let key = read_input(key.as_deref(), None).await?;
            let key = key.trim();
            if key.is_empty() {
                bail!("API key is empty");
            }
            keychain
                .set(services::for_provider(desc.id), accounts::API_KEY, key)
                .await
                .context("Failed to store API key")?;
            info!(provider = %desc.display_name(), "API key stored");
            if !cli.quiet {
                println!("Stored API key for {}", desc.display_name());
            }
        }
        KeyAction::Remove { provider } => {
            let desc = provider_by_name(provider)?;
            keychain
                .delete(services::for_provider(desc.id), accounts::API_KEY)
                .await
                .context("Failed to remove API key")?;
            info!(provider = %desc.display_name(), "API key removed");
            if !cli.quiet {
                println!("Removed API key for {}", desc.display_name());
            }
        }
        KeyAction::Status { provider } => {
            let descriptors: Vec<&ProviderDescriptor> = match provider {
                Some(name) => vec![provider_by_name(name)?],
                None => ProviderRegistry::all().iter().collect(),
            };
            let settings = SettingsStore::load_default().await?.get().await;

            let mut statuses = Vec::with_capacity(descriptors.len());
            for desc in descriptors {
                statuses.push(key_status(desc, &settings, &keychain).await);
            }
            print_key_statuses(&statuses, cli)?;
        }
    }

    Ok(())
}

async fn key_status(
    desc: &ProviderDescriptor,
    settings: &Settings,
    keychain: &dyn KeychainApi,
) -> KeyStatus {
    let overrides = settings.provider_settings.get(&desc.id);
    let env_var = overrides
        .and_then(|ps| ps.api_key_env.clone())
        .unwrap_or_else(|| desc.metadata.api_key_env.to_string());
    let env_set = std::env::var(&env_var).is_ok_and(|v| !v.trim().is_empty());
    let keychain_set = keychain
        .exists(services::for_provider(desc.id), accounts::API_KEY)
        .await;
    let endpoint = match overrides.and_then(|ps| ps.base_url.as_deref()) {
        Some(base) => format!("{}{}", base.trim_end_matches('/'), desc.api.endpoint),
        None => desc.default_endpoint_url(),
    };

    KeyStatus {
        provider: desc.id.cli_name(),
        env_var,
        env_set,
        keychain_set,
        endpoint,
    }
}

fn print_key_statuses(statuses: &[KeyStatus], cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            for status in statuses {
                let mark = if status.source() == "missing" {
                    "✗"
                } else {
                    "✓"
                };
                println!(
                    "{} {:<10} {:<12} ({})",
                    mark,
                    status.provider,
                    status.source(),
                    status.env_var
                );
                if cli.verbose {
                    println!("  {}", status.endpoint);
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&statuses)?);
        }
    }
    Ok(())
}
