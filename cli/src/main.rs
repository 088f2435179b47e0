//! lexlens CLI - watch a source file and report tokenizer diagnostics.
//!
//! # Architecture
//!
//! The binary plays the editor's part: it owns a [`DiagnosticsSession`] backed by
//! [`HttpAnalyzer`] and an in-memory [`MarkerLayer`], and feeds it edits.
//!
//! ```text
//! main() -> LexlensConfig::load() -> DiagnosticsSession::with_panel()
//!                                        |
//!              --once: analyze_now() -> next_outcome() -> report -> exit
//!              watch:  poll file -> on_edit() ... next_outcome() -> report
//! ```
//!
//! Logs go to a file so they never interleave with the report on stdout.

mod config;

use anyhow::{Context, Result, bail};
use std::{
    env,
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use lexlens_analysis::HttpAnalyzer;
use lexlens_pipeline::{DiagnosticsSession, MarkerLayer, PipelineOutcome, TokenPanel};
use lexlens_types::TokenSummary;

use crate::config::LexlensConfig;

/// How often the watched file is checked for changes.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

const USAGE: &str = "usage: lexlens <path> [--once] [--json]";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mixing logs into the report.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.lexlens/logs/lexlens.log
    if let Some(config_path) = LexlensConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("lexlens.log"));
    }

    // Fallback: ./.lexlens/logs/lexlens.log
    candidates.push(PathBuf::from(".lexlens").join("logs").join("lexlens.log"));

    candidates
}

#[derive(Debug, PartialEq, Eq)]
struct Args {
    path: PathBuf,
    once: bool,
    json: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut path = None;
    let mut once = false;
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "--once" => once = true,
            "--json" => json = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with('-') => bail!("unknown option '{flag}'\n{USAGE}"),
            _ if path.is_some() => bail!("unexpected argument '{arg}'\n{USAGE}"),
            _ => path = Some(PathBuf::from(arg)),
        }
    }

    let Some(path) = path else {
        bail!(USAGE);
    };
    Ok(Args { path, once, json })
}

/// Token panel that prints each accepted classification to stdout.
struct ConsolePanel {
    enabled: bool,
}

impl TokenPanel for ConsolePanel {
    fn show_tokens(&mut self, tokens: &TokenSummary) {
        if self.enabled {
            print!("{}", render_tokens(tokens));
        }
    }
}

fn render_tokens(tokens: &TokenSummary) -> String {
    let mut out = String::new();
    for (category, entries) in tokens.categories() {
        out.push_str(category.label());
        out.push_str(":\n");
        for entry in entries {
            out.push_str("  ");
            out.push_str(entry);
            out.push('\n');
        }
    }
    out
}

type Session = DiagnosticsSession<HttpAnalyzer, MarkerLayer, ConsolePanel>;

fn report(session: &Session, path: &Path, outcome: &PipelineOutcome, json: bool) -> Result<()> {
    match outcome {
        PipelineOutcome::Applied { .. } if json => {
            println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        }
        PipelineOutcome::Applied { .. } => {
            for diagnostic in session.diagnostics() {
                println!("{}", diagnostic.display_with_path(path));
            }
            let status = session.status_string();
            if status.is_empty() {
                println!("{}: no problems", path.display());
            } else {
                println!("{}: {status}", path.display());
            }
        }
        PipelineOutcome::Stale { .. } => {}
        PipelineOutcome::Failed { error, .. } => {
            eprintln!("lexlens: analysis failed: {error}");
        }
    }
    Ok(())
}

async fn run_once(mut session: Session, path: &Path, text: String, json: bool) -> Result<()> {
    session.on_edit(text);
    session.analyze_now();
    let outcome = session
        .next_outcome()
        .await
        .context("analysis channel closed")?;
    report(&session, path, &outcome, json)?;
    session.dispose();

    if let PipelineOutcome::Failed { error, .. } = outcome {
        return Err(error.into());
    }
    Ok(())
}

/// Feed file changes into the session until `shutdown` completes.
async fn run_watch(
    mut session: Session,
    path: &Path,
    text: String,
    json: bool,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut last = text.clone();
    session.on_edit(text);

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // One future for the whole loop so a signal raised mid-handler is not lost.
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                match tokio::fs::read_to_string(path).await {
                    Ok(text) if text != last => {
                        let revision = session.on_edit(text.clone());
                        tracing::debug!(revision = %revision, "File changed");
                        last = text;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to read watched file");
                    }
                }
            }
            outcome = session.next_outcome() => {
                let Some(outcome) = outcome else { break };
                report(&session, path, &outcome, json)?;
            }
        }
    }

    session.dispose();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(env::args().skip(1))?;

    init_tracing();

    let config = match LexlensConfig::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %e.path().display(), "Config rejected; using defaults");
            eprintln!("lexlens: {e}; using defaults");
            LexlensConfig::default()
        }
    };

    let analyzer = HttpAnalyzer::new(&config.service())?;
    tracing::info!(url = %analyzer.url(), path = %args.path.display(), "Starting lexlens");

    let text = tokio::fs::read_to_string(&args.path)
        .await
        .with_context(|| format!("failed to read {}", args.path.display()))?;

    let panel = ConsolePanel { enabled: !args.json };
    let session =
        DiagnosticsSession::with_panel(analyzer, MarkerLayer::new(), panel, &config.pipeline());

    if args.once {
        run_once(session, &args.path, text, args.json).await
    } else {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };
        run_watch(session, &args.path, text, args.json, ctrl_c).await
    }
}
