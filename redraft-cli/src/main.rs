// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! Redraft CLI - revise text with several LLMs at once.
//!
//! # Examples
//!
//! ```bash
//! # Revise text with the default three models
//! redraft revise "Their going to the libary tomorow."
//!
//! # Revise a file with two specific models and save the results
//! redraft revise --file draft.txt -m gpt-4.1 -m claude-sonnet-4-20250514 --output
//!
//! # Estimate the cost before sending
//! redraft estimate --file draft.txt
//!
//! # Keep a custom instruction for this session
//! redraft prompt set --layer session "Tighten the prose. Keep British spelling."
//!
//! # Session spend
//! redraft session show
//!
//! # JSON output
//! redraft --format json --pretty models
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use redraft_core::{CoreError, ValidationError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, estimate, models, prompt, revise, session};

// ============================================================================
// CLI Definition
// ============================================================================

/// Redraft CLI - parallel multi-model text revision.
#[derive(Parser)]
#[command(name = "redraft")]
#[command(about = "Revise text with several LLMs in parallel")]
#[command(long_about = r#"
Redraft sends the same text to several language models at once and shows
each revision as it arrives, together with its token usage and cost.

Supported providers:
  • OpenAI (openai)
  • Anthropic (anthropic)
  • Google Gemini (gemini)

API keys are read from OPENAI_API_KEY, ANTHROPIC_API_KEY and GEMINI_API_KEY,
or from the system keychain (see `redraft config key`).

Examples:
  redraft revise "Some text"       # Default models
  redraft revise -f draft.txt -o   # From a file, export results
  redraft estimate -f draft.txt    # Cost before sending
  redraft models                   # Available models and prices
  redraft session show             # Spend so far
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'F', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Send text to the selected models and show each revision.
    #[command(visible_alias = "r")]
    Revise(revise::ReviseArgs),

    /// Estimate the cost of a revision without sending it.
    #[command(visible_alias = "e")]
    Estimate(estimate::EstimateArgs),

    /// List available models and their prices.
    #[command(visible_alias = "m")]
    Models(models::ModelsArgs),

    /// Show or change the system instruction.
    Prompt(prompt::PromptArgs),

    /// Show or reset session spend.
    #[command(visible_alias = "s")]
    Session(session::SessionArgs),

    /// Manage configuration and API keys.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

impl Cli {
    /// Whether text output may use ANSI colors.
    pub fn use_colors(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }
}

/// CLI exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Every target in a round failed.
    AllFailed = 2,
    /// The request was rejected before anything was sent.
    Validation = 3,
}

impl ExitCode {
    /// Picks the exit code for a command error.
    pub fn for_error(error: &anyhow::Error) -> Self {
        let is_validation = error.chain().any(|cause| {
            cause.downcast_ref::<ValidationError>().is_some()
                || cause
                    .downcast_ref::<CoreError>()
                    .is_some_and(CoreError::is_validation)
        });
        if is_validation {
            Self::Validation
        } else {
            Self::Error
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("redraft=debug,info")
        } else {
            EnvFilter::new("redraft=warn")
        }
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Revise(args) => revise::run(args, &cli).await,
        Commands::Estimate(args) => estimate::run(args, &cli).await,
        Commands::Models(args) => models::run(args, &cli).await,
        Commands::Prompt(args) => prompt::run(args, &cli).await,
        Commands::Session(args) => session::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli).await,
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    std::process::exit(code as i32);
}

// ============================================================================
// Tests
// ============================================================================
