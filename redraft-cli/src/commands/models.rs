//! Models command - list the catalog.

use anyhow::{Result, bail};
use clap::Args;
use redraft_core::ModelInfo;
use redraft_providers::ProviderRegistry;

use super::load_catalog;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    /// Only list models of this provider (openai, anthropic, gemini).
    #[arg(long, short = 'P')]
    pub provider: Option<String>,
}

/// Runs the models command.
pub async fn run(args: &ModelsArgs, cli: &Cli) -> Result<ExitCode> {
    let catalog = load_catalog().await?;

    let models: Vec<&ModelInfo> = match &args.provider {
        Some(name) => {
            let Some(desc) = ProviderRegistry::get_by_cli_name(name) else {
                bail!("Unknown provider: {name}");
            };
            catalog.by_provider(desc.id)
        }
        None => catalog.all().iter().collect(),
    };
    let defaults = catalog.default_models();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(cli.use_colors());
            println!("{}", formatter.format_models_header());
            println!("{}", "─".repeat(68));
            for model in &models {
                let is_default = defaults.iter().any(|d| d == &model.id);
                println!("{}", formatter.format_model_line(model, is_default));
            }
            if !cli.quiet {
                println!();
                println!("* selected by default");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_models(&models, defaults)?);
        }
    }

    Ok(ExitCode::Success)
}
