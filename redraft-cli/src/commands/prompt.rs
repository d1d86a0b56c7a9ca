//! Prompt command - manage the stored instruction layers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Args, Subcommand, ValueEnum};
use redraft_core::PromptLayer;
use redraft_store::{PromptStore, SessionStore, SettingsStore};

use super::read_input;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the prompt command.
#[derive(Args)]
pub struct PromptArgs {
    #[command(subcommand)]
    pub action: PromptAction,
}

/// Prompt subcommands.
#[derive(Subcommand)]
pub enum PromptAction {
    /// Show stored layers and the instruction in effect.
    Show,

    /// Store an instruction.
    Set {
        /// Instruction text. Read from --file or stdin when omitted.
        text: Option<String>,

        /// Read the instruction from a file.
        #[arg(long, short = 'f', conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Layer to store it in.
        #[arg(long, short = 'l', value_enum, default_value_t = StoredLayer::Session)]
        layer: StoredLayer,
    },

    /// Remove a stored instruction.
    Clear {
        /// Layer to clear; both when omitted.
        #[arg(long, short = 'l', value_enum)]
        layer: Option<StoredLayer>,
    },
}

/// Layers that outlive a single revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoredLayer {
    /// Until `redraft session reset`.
    Session,
    /// Until cleared.
    Persistent,
}

impl From<StoredLayer> for PromptLayer {
    fn from(layer: StoredLayer) -> Self {
        match layer {
            StoredLayer::Session => PromptLayer::Session,
            StoredLayer::Persistent => PromptLayer::Persistent,
        }
    }
}

/// Runs the prompt command.
pub async fn run(args: &PromptArgs, cli: &Cli) -> Result<ExitCode> {
    let settings = Arc::new(SettingsStore::load_default().await?);
    let session = Arc::new(SessionStore::load_default().await?);
    let prompts = PromptStore::new(settings, session);

    match &args.action {
        PromptAction::Show => show(&prompts, cli).await?,
        PromptAction::Set { text, file, layer } => {
            let text = read_input(text.as_deref(), file.as_deref()).await?;
            if text.trim().is_empty() {
                bail!("Instruction is empty; use `redraft prompt clear` to remove one");
            }
            prompts.set((*layer).into(), text.trim()).await?;
            if !cli.quiet {
                println!("Stored {} instruction", PromptLayer::from(*layer));
            }
        }
        PromptAction::Clear { layer } => {
            match layer {
                Some(layer) => prompts.clear((*layer).into()).await?,
                None => {
                    prompts.clear(PromptLayer::Session).await?;
                    prompts.clear(PromptLayer::Persistent).await?;
                }
            }
            if !cli.quiet {
                println!("Cleared; {} instruction in effect", prompts.resolve(None).await.layer);
            }
        }
    }

    Ok(ExitCode::Success)
}

async fn show(prompts: &PromptStore, cli: &Cli) -> Result<()> {
    let layers = prompts.layers().await;
    let effective = prompts.resolve(None).await;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(cli.use_colors());
            println!("{}", formatter.format_prompts(&layers, &effective));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_prompts(&layers, &effective)?);
        }
    }
    Ok(())
}
