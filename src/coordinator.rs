//! The run coordinator: one invocation, one output artifact.
//!
//! Sequences a [`RegionScraper`] per requested region over a single
//! shared [`RunState`] (so URL dedup is global), persists incrementally
//! through the JSON sink, and finishes with the final flush, the run
//! report, and a summary log line.
//!
//! Failure semantics: per-source and per-article failures are recorded
//! and scraping continues; only pre-flight configuration problems —
//! an unwritable output location, a filter combination matching no
//! sources — abort the run, and they do so before any network activity.

use crate::error::{ConfigError, RunError};
use crate::fetcher::PageFetcher;
use crate::models::{Category, Region};
use crate::outputs::json::{JsonArticleSink, StateSink};
use crate::outputs::report::{RunReport, report_path, write_report};
use crate::region::{CancelToken, RegionScraper};
use crate::sources;
use crate::state::RunState;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tracing::{info, instrument};

/// Everything one run needs, resolved from the CLI before any scraping.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path of the output JSON array; the report lands next to it.
    pub output: PathBuf,
    /// Retries per URL beyond the first attempt.
    pub max_retries: u32,
    /// Cap on sources taken from each requested region.
    pub max_sources: Option<usize>,
    /// Cap on article links taken from each source's index page.
    pub max_articles: Option<usize>,
    pub category: Option<Category>,
    /// `None` scrapes all three regions in fixed order.
    pub region: Option<Region>,
}

/// Execute one full run. Returns the report on completion; `Err` only on
/// fatal configuration or final-output problems.
#[instrument(level = "info", skip_all, fields(output = %config.output.display()))]
pub async fn run(
    config: &RunConfig,
    fetcher: &dyn PageFetcher,
    cancel: &CancelToken,
) -> Result<RunReport, RunError> {
    let started = Instant::now();

    ensure_writable_output(&config.output).await?;

    let selected = sources::select(config.region, config.category, config.max_sources);
    if selected.is_empty() {
        return Err(ConfigError::EmptySelection.into());
    }
    info!(
        sources = selected.len(),
        region = ?config.region,
        category = ?config.category,
        "Run starting"
    );

    let sink = JsonArticleSink::new(config.output.clone());
    let mut state = RunState::new();

    let regions: Vec<Region> = match config.region {
        Some(r) => vec![r],
        None => Region::ALL.to_vec(),
    };
    for region in regions {
        if cancel.is_cancelled() {
            break;
        }
        let region_sources: Vec<_> = selected
            .iter()
            .copied()
            .filter(|s| s.region == region)
            .collect();
        if region_sources.is_empty() {
            continue;
        }
        let scraper = RegionScraper::new(fetcher, region, config.category, config.max_articles);
        scraper
            .scrape(&region_sources, &mut state, &sink, cancel)
            .await;
    }

    // Final write is authoritative even though every source already flushed.
    sink.flush(&state).await?;

    let report = RunReport::from_state(&state, started.elapsed());
    write_report(&report, &report_path(&config.output)).await?;

    info!(
        total_articles = report.total_articles,
        sources_attempted = report.sources_attempted,
        sources_succeeded = report.sources_succeeded,
        sources_failed = report.sources_failed,
        articles_skipped = report.articles_skipped,
        elapsed_seconds = report.elapsed_seconds,
        cancelled = cancel.is_cancelled(),
        "Run complete"
    );
    Ok(report)
}

/// Pre-flight: the output's parent directory must exist (or be creatable)
/// and accept a probe write. Runs before any network activity so a bad
/// `--output` never wastes a scrape.
async fn ensure_writable_output(output: &Path) -> Result<(), ConfigError> {
    let unwritable = |source| ConfigError::UnwritableOutput {
        path: output.display().to_string(),
        source,
    };

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).await.map_err(&unwritable)?;

    let probe = parent.join(".__probe_write__");
    fs::write(&probe, b"probe").await.map_err(&unwritable)?;
    let _ = fs::remove_file(&probe).await;
    info!(path = %output.display(), "Output location is writable");
    Ok(())
}
