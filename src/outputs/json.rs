//! Incremental JSON persistence for the article array.
//!
//! The coordinator flushes [`RunState`] through a [`StateSink`] after
//! every completed source, not only at run end. A crash, rate-limit ban,
//! or Ctrl-C mid-run therefore loses at most the source in flight.
//!
//! Each flush rewrites the whole array to a temp file and renames it over
//! the destination, so readers never observe a truncated JSON document —
//! the rename is the commit point.

use crate::error::OutputError;
use crate::state::RunState;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};

/// Persistence seam for run state. The production implementation writes
/// JSON; tests substitute in-memory sinks.
#[async_trait]
pub trait StateSink: Send + Sync {
    async fn flush(&self, state: &RunState) -> Result<(), OutputError>;
}

/// Writes the accepted articles as a pretty-printed JSON array.
pub struct JsonArticleSink {
    path: PathBuf,
}

impl JsonArticleSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateSink for JsonArticleSink {
    async fn flush(&self, state: &RunState) -> Result<(), OutputError> {
        let json = serde_json::to_string_pretty(&state.articles)?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(path = %self.path.display(), "Replaced output atomically");
        info!(
            count = state.articles.len(),
            path = %self.path.display(),
            "Flushed articles"
        );
        Ok(())
    }
}

/// Discards flushes. Used by tests that exercise orchestration only.
#[cfg(test)]
pub struct NullSink;

#[cfg(test)]
#[async_trait]
impl StateSink for NullSink {
    async fn flush(&self, _state: &RunState) -> Result<(), OutputError> {
        Ok(())
    }
}
