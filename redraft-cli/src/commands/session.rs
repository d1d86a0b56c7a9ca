//! Session command - spend accumulated across revisions.

use anyhow::Result;
use clap::{Args, Subcommand};
use redraft_store::SessionStore;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the session command.
#[derive(Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub action: SessionAction,
}

/// Session subcommands.
#[derive(Subcommand)]
pub enum SessionAction {
    /// Show total cost and request count.
    Show,

    /// Zero the totals and drop the session instruction.
    Reset,
}

/// Runs the session command.
pub async fn run(args: &SessionArgs, cli: &Cli) -> Result<ExitCode> {
    let session = SessionStore::load_default().await?;

    match args.action {
        SessionAction::Show => {
            let state = session.state().await;
            match cli.format {
                OutputFormat::Text => {
                    let formatter = TextFormatter::new(cli.use_colors());
                    println!("{}", formatter.format_totals(&state.totals, state.updated_at));
                }
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format_totals(&state.totals, state.updated_at)?);
                }
            }
        }
        SessionAction::Reset => {
            session.reset().await;
            session.save().await?;
            info!(path = %session.path().display(), "Session reset");
            if !cli.quiet {
                println!("Session reset");
            }
        }
    }

    Ok(ExitCode::Success)
}
