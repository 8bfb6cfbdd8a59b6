//! Run report generation.
//!
//! After a run completes, a `*_report.json` is written next to the output
//! file: counts by source, region, and category, average content length,
//! how many sources were attempted/succeeded/failed, and the full error
//! log. The report is how skipped sources and articles stay visible —
//! best-effort partial output must never hide data loss.

use crate::error::OutputError;
use crate::models::{Category, Region};
use crate::state::{ErrorEntry, RunState, Stage};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::info;

/// Summary of one completed run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub total_articles: usize,
    pub by_source: BTreeMap<String, usize>,
    pub by_region: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub average_content_length: f64,
    pub sources_attempted: usize,
    pub sources_succeeded: usize,
    pub sources_failed: usize,
    pub articles_skipped: usize,
    pub errors: Vec<ErrorEntry>,
    pub elapsed_seconds: f64,
    pub finished_at: String,
}

impl RunReport {
    pub fn from_state(state: &RunState, elapsed: Duration) -> Self {
        let mut by_source = BTreeMap::new();
        let mut by_region: BTreeMap<String, usize> = Region::ALL
            .iter()
            .map(|r| (r.to_string(), 0))
            .collect();
        let mut by_category: BTreeMap<String, usize> = Category::ALL
            .iter()
            .map(|c| (c.to_string(), 0))
            .collect();

        let mut total_content_length = 0usize;
        for article in &state.articles {
            *by_source.entry(article.source.clone()).or_insert(0) += 1;
            *by_region.entry(article.region.to_string()).or_insert(0) += 1;
            *by_category.entry(article.category.to_string()).or_insert(0) += 1;
            total_content_length += article.content_length;
        }

        let average_content_length = if state.articles.is_empty() {
            0.0
        } else {
            total_content_length as f64 / state.articles.len() as f64
        };

        Self {
            total_articles: state.articles.len(),
            by_source,
            by_region,
            by_category,
            average_content_length,
            sources_attempted: state.sources_attempted,
            sources_succeeded: state.sources_succeeded,
            sources_failed: state.sources_failed,
            articles_skipped: state.articles_skipped(),
            errors: state.errors.clone(),
            elapsed_seconds: elapsed.as_secs_f64(),
            finished_at: Utc::now().to_rfc3339(),
        }
    }

    /// Names of sources whose index stage failed outright.
    pub fn failed_sources(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .errors
            .iter()
            .filter(|e| e.stage == Stage::Index)
            .map(|e| e.source.as_str())
            .collect();
        names.dedup();
        names
    }
}

/// `articles.json` -> `articles_report.json`, next to the output file.
pub fn report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "run".to_string());
    output.with_file_name(format!("{stem}_report.json"))
}

pub async fn write_report(report: &RunReport, path: &Path) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).await?;
    info!(path = %path.display(), "Wrote run report");
    Ok(())
}
