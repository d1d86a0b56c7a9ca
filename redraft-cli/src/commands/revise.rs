//! Revise command - fan a text out to several models.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use redraft_core::{
    NormalizedRequest, RevisionBundle, ValidationError,
    text::{prepare_input, render_user_message},
};
use redraft_fetch::{FetchContext, RoundEvent};
use redraft_providers::ProviderRegistry;
use redraft_store::{PromptStore, RevisionStore, SessionStore, SettingsStore};
use tracing::{debug, info, warn};

use super::{load_catalog, read_input, select_targets};
use crate::output::{JsonFormatter, TextFormatter, format_bundle};
use crate::{Cli, ExitCode, OutputFormat};

/// Arguments for the revise command.
#[derive(Args)]
pub struct ReviseArgs {
    /// Text to revise. Read from --file or stdin when omitted.
    pub text: Option<String>,

    /// Read the text from a file.
    #[arg(long, short = 'f', conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Model id to use; repeat for several models.
    #[arg(long = "model", short = 'm')]
    pub models: Vec<String>,

    /// Sampling temperature (0.0 to 1.0).
    #[arg(long, short = 't')]
    pub temperature: Option<f64>,

    /// System instruction for this revision only.
    #[arg(long, short = 'p')]
    pub prompt: Option<String>,

    /// Keep footnote markers such as [12] or (iv).
    #[arg(long)]
    pub no_footnote_removal: bool,

    /// Save successful outputs. Takes a file or directory; defaults to
    /// output-<timestamp>.txt in the current directory.
    #[arg(long, short = 'o', num_args = 0..=1, value_name = "PATH")]
    pub output: Option<Option<PathBuf>>,
}

/// Runs the revise command.
pub async fn run(args: &ReviseArgs, cli: &Cli) -> Result<ExitCode> {
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

    let prompts = PromptStore::new(Arc::clone(&settings_store), Arc::clone(&session));
    let prompt = prompts.resolve(args.prompt.as_deref()).await;
    debug!(layer = %prompt.layer, "Resolved system instruction");

    let temperature = args.temperature.unwrap_or(settings.temperature);
    let request = NormalizedRequest::new(user_message, prompt.text.clone(), temperature);

    let ctx = FetchContext::builder()
        .settings(settings.fetch_settings())
        .build()
        .context("Failed to create HTTP client")?;
    let fanout = ProviderRegistry::build_fanout(Arc::new(ctx)).with_recorder(session.ledger());

    let panels = RevisionStore::new();
    panels.set_targets(&targets).await;

    info!(targets = targets.len(), temperature, "Submitting revision");
    let mut round = fanout.dispatch(request, targets.clone())?;

    let text = TextFormatter::new(cli.use_colors());
    let stream_text = cli.format == OutputFormat::Text && !cli.quiet;

    while let Some(event) = round.next_event().await {
        panels.apply(&event.to_update()).await;

        if let RoundEvent::Finished(result) = &event {
            if stream_text {
                if let Some(panel) = panels.get(&result.target_id).await {
                    println!("{}\n", text.format_panel(&panel));
                }
            }
        }
    }

    let results = round.join().await;
    let succeeded = results.iter().filter(|r| r.is_success()).count();

    if let Err(e) = session.save().await {
        warn!(error = %e, "Failed to save session");
    }
    let totals = session.totals();

    let saved_to = match &args.output {
        Some(requested) => {
            let bundle = panels.export_bundle().await;
            if bundle.is_empty() {
                warn!("No successful outputs to export");
                None
            } else {
                Some(write_export(&bundle, requested.as_deref()).await?)
            }
        }
        None => None,
    };

    match cli.format {
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", text.format_round_summary(succeeded, results.len()));
                println!("{}", text.format_totals_line(&totals));
                if let Some(path) = &saved_to {
                    println!("Saved to {}", path.display());
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!(
                "{}",
                formatter.format_round(
                    &targets,
                    &results,
                    prompt.layer,
                    &totals,
                    saved_to.map(|p| p.display().to_string()),
                )?
            );
        }
    }

    if succeeded == 0 {
        return Ok(ExitCode::AllFailed);
    }
    Ok(ExitCode::Success)
}

/// Where an export goes: a directory gets the default filename, any other
/// path is used as is, and no path means the current directory.
fn export_path(bundle: &RevisionBundle, requested: Option<&Path>) -> PathBuf {
    match requested {
        Some(path) if path.is_dir() => path.join(bundle.default_filename()),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(bundle.default_filename()),
    }
}

async fn write_export(bundle: &RevisionBundle, requested: Option<&Path>) -> Result<PathBuf> {
    let path = export_path(bundle, requested);
    tokio::fs::write(&path, format_bundle(bundle))
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), sections = bundle.sections.len(), "Exported revisions");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use redraft_core::ProviderKind;

    fn bundle() -> RevisionBundle {
        let mut bundle = RevisionBundle::new();
        bundle.push("GPT-4.1", ProviderKind::OpenAi, "First.");
        bundle.push("Gemini 2.5 Pro", ProviderKind::Gemini, "Second.");
        bundle
    }

    #[test]
    fn test_export_path_resolution() {
        let bundle = bundle();
        let dir = tempfile::tempdir().unwrap();

        let in_dir = export_path(&bundle, Some(dir.path()));
        assert_eq!(in_dir, dir.path().join(bundle.default_filename()));

        let explicit = dir.path().join("mine.txt");
        assert_eq!(export_path(&bundle, Some(&explicit)), explicit);

        assert_eq!(
            export_path(&bundle, None),
            PathBuf::from(bundle.default_filename())
        );
    }

    #[tokio::test]
    async fn test_write_export() {
        let bundle = bundle();
        let dir = tempfile::tempdir().unwrap();

        let path = write_export(&bundle, Some(dir.path())).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("output-"));
        assert!(written.starts_with("=== GPT-4.1 ===\n\nFirst.\n"));
        assert!(written.contains("=== Gemini 2.5 Pro ===\n\nSecond.\n"));
    }
}
