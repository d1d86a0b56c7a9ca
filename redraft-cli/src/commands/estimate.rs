//! Estimate command - cost of a revision before it is sent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use redraft_core::{
    CostEstimate, ValidationError,
    text::{prepare_input, render_user_message},
};
use redraft_store::{PromptStore, SessionStore, SettingsStore};

use super::{load_catalog, read_input, select_targets};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the estimate command.
#[derive(Args)]
pub struct EstimateArgs {
    /// Text to estimate. Read from --file or stdin when omitted.
    pub text: Option<String>,

    /// Read the text from a file.
    #[arg(long, short = 'f', conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Model id to estimate for; repeat for several models.
    #[arg(long = "model", short = 'm')]
    pub models: Vec<String>,

    /// System instruction to assume instead of the stored one.
    #[arg(long, short = 'p')]
    pub prompt: Option<String>,

    /// Keep footnote markers such as [12] or (iv).
    #[arg(long)]
    pub no_footnote_removal: bool,
}

/// Runs the estimate command.
pub async fn run(args: &EstimateArgs, cli: &Cli) -> Result<ExitCode> {
    let raw = read_input(args.text.as_deref(), args.file.as_deref()).await?;

    let settings_store = Arc::new(SettingsStore::load_default().await?);
    let session = Arc::new(SessionStore::load_default().await?);
    let settings = settings_store.get().await;

    let catalog = load_catalog().await?;
    let targets = select_targets(&catalog, &args.models, &settings)?;

    let prepared = prepare_input(&raw, settings.remove_footnotes && !args.no_footnote_removal);
    if prepared.trim().is_empty() {
        return Err(ValidationError::EmptyText.into());
    }
    let user_message = render_user_message(&settings.user_template, &prepared);

    let prompt = PromptStore::new(settings_store, session)
        .resolve(args.prompt.as_deref())
        .await;

    let estimates: Vec<CostEstimate> = targets
        .iter()
        .map(|target| CostEstimate::for_target(target, &prompt.text, &user_message))
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(cli.use_colors());
            println!("{}", formatter.format_estimates(&targets, &estimates));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_estimates(&estimates)?);
        }
    }

    Ok(ExitCode::Success)
}
