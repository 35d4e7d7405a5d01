//! Orchestrates one daily run: sheet → message → heatmap → pipeline output.

use crate::capture::{self, ArtifactPaths, BrowserSession, CaptureReport, EokaSession};
use crate::config::{BrowserConfig, Config};
use crate::snapshot::{self, MarketSnapshot};
use crate::{output, Result};
use std::future::Future;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Result of a successful run.
#[derive(Debug)]
pub struct RunReport {
    /// Report date in the configured timezone.
    pub date: String,
    pub snapshot: MarketSnapshot,
    /// Formatted message.
    pub message: String,
    pub capture: CaptureReport,
    /// Whether the message was written to a pipeline output file.
    pub output_written: bool,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

/// Run both pipelines against the live sheet and a stealth browser.
///
/// `github_output` is the pipeline output file; `None` means a local run and
/// nothing is written.
pub async fn run(config: &Config, github_output: Option<&Path>) -> Result<RunReport> {
    let client = snapshot::sheet::client(&config.sheet)?;
    run_with(
        config,
        github_output,
        snapshot::sheet::fetch_csv(&client, &config.sheet),
        |browser| async move { EokaSession::launch(&browser).await },
    )
    .await
}

/// Run with an explicit CSV source and browser launcher.
///
/// The sheet is read and parsed first, so a malformed row aborts before a
/// browser is launched. The message is emitted only after the capture
/// succeeds.
pub async fn run_with<S, L, Fut>(
    config: &Config,
    github_output: Option<&Path>,
    csv: impl Future<Output = Result<String>>,
    launch: L,
) -> Result<RunReport>
where
    S: BrowserSession,
    L: FnOnce(BrowserConfig) -> Fut,
    Fut: Future<Output = Result<S>>,
{
    let start = Instant::now();
    let date = config.output.report_date()?;
    info!("{} for {}", config.name, date);

    let snapshot = snapshot::parse_snapshot(&csv.await?)?;
    let message = snapshot::format_message(&snapshot);
    info!("Sheet data:\n{}", message);

    let paths = ArtifactPaths::resolve(&config.output, &date);
    let capture = capture::capture_with(&config.capture, &paths, launch).await?;

    let output_written = emit(github_output, &config.output.output_key, &message)?;

    Ok(RunReport {
        date,
        snapshot,
        message,
        capture,
        output_written,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Append the message to the pipeline output file, if there is one.
pub fn emit(github_output: Option<&Path>, key: &str, message: &str) -> Result<bool> {
    match github_output {
        Some(path) => {
            output::append(path, key, message)?;
            Ok(true)
        }
        None => {
            info!("No pipeline output file (local run)");
            Ok(false)
        }
    }
}
