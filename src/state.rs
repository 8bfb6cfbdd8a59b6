//! The mutable accumulator for one pipeline run.
//!
//! [`RunState`] collects accepted articles, the run-wide seen-URL set for
//! deduplication, per-source counters, and an explicit error log. It is
//! created at run start, mutated only by the region-scraper/coordinator
//! sequence, flushed to disk incrementally, and discarded at run end.

use crate::models::Article;
use serde::Serialize;
use std::collections::HashSet;

/// Pipeline stage an error was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Fetching a source's index page.
    Index,
    /// Fetching one article page.
    Fetch,
    /// Extracting fields from fetched markup.
    Extract,
}

/// One recoverable failure, kept so the run report can account for every
/// skipped source and article — silent data loss is the failure mode this
/// log exists to prevent.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub stage: Stage,
    pub message: String,
}

/// Accumulated state of one run.
#[derive(Debug, Default)]
pub struct RunState {
    /// Accepted articles, in acceptance order.
    pub articles: Vec<Article>,
    seen_urls: HashSet<String>,
    pub sources_attempted: usize,
    pub sources_succeeded: usize,
    pub sources_failed: usize,
    pub errors: Vec<ErrorEntry>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a URL has already produced an accepted article this run.
    pub fn has_seen(&self, url: &str) -> bool {
        self.seen_urls.contains(url)
    }

    /// Accept an article unless its URL was already seen (first-seen wins).
    /// Returns whether the article was added.
    pub fn add_article(&mut self, article: Article) -> bool {
        debug_assert_eq!(article.content_length, article.content.len());
        if !self.seen_urls.insert(article.url.clone()) {
            return false;
        }
        self.articles.push(article);
        true
    }

    pub fn record_error(&mut self, source: &str, url: Option<&str>, stage: Stage, message: String) {
        self.errors.push(ErrorEntry {
            source: source.to_string(),
            url: url.map(str::to_string),
            stage,
            message,
        });
    }

    /// Articles that were discovered but skipped (fetch or extract failed).
    pub fn articles_skipped(&self) -> usize {
        self.errors.iter().filter(|e| e.stage != Stage::Index).count()
    }
}
