//! Error taxonomy for the scraping pipeline.
//!
//! The taxonomy mirrors how failures propagate:
//! - [`FetchError`]: one URL gave up (after retries, or immediately for a
//!   permanent failure). Recorded in the run's error log; never aborts a run.
//! - [`ExtractionError`]: the markup was fetched but a required field was
//!   missing. The article is skipped.
//! - [`ConfigError`]: the run cannot start at all (unwritable output path,
//!   empty source selection). The only errors that produce a non-zero exit.

use std::io;
use thiserror::Error;

/// Whether a failed fetch attempt is worth retrying.
///
/// Timeouts, connection errors, HTTP 429 and 5xx are [`Retryable`];
/// other 4xx statuses and malformed URLs are [`Permanent`] and
/// short-circuit the retry loop.
///
/// [`Retryable`]: FailureKind::Retryable
/// [`Permanent`]: FailureKind::Permanent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Retryable,
    Permanent,
}

/// A fetch that gave up, either after exhausting retries or on a
/// permanent failure.
#[derive(Debug, Error)]
#[error("fetch of {url} failed after {attempts} attempt(s): {message}")]
pub struct FetchError {
    pub url: String,
    pub kind: FailureKind,
    /// Total attempts made before giving up (0 for a malformed URL,
    /// which is rejected before any request goes out).
    pub attempts: u32,
    pub message: String,
}

/// The markup was fetched but could not be turned into an [`Article`].
///
/// [`Article`]: crate::models::Article
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// A required field (title, content) produced no text.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A selector rule in the source catalog does not parse.
    #[error("invalid selector rule `{0}`")]
    BadSelector(String),
}

/// A problem writing the output or report file.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("serializing output failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fatal pre-flight configuration problems. These abort before any
/// network activity and are the only path to a non-zero exit code.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("output path `{path}` is not writable: {source}")]
    UnwritableOutput {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no sources match the requested region/category filters")]
    EmptySelection,
}

/// Top-level run failure returned by the coordinator.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("writing final output failed: {0}")]
    Output(#[from] OutputError),
}
