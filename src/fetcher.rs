//! HTTP fetching with identity rotation and bounded retries.
//!
//! The fetcher is split in two layers so the retry policy is testable
//! without a network or a real clock:
//!
//! - [`FetchOnce`]: one HTTP GET with a timeout, a caller-supplied
//!   user-agent, and failure classification into retryable vs permanent.
//! - [`RetryingFetcher`]: a decorator over any [`FetchOnce`] that applies
//!   capped exponential backoff, draws a fresh identity per attempt, and
//!   enforces the attempt bound: `max_retries = N` means exactly `N + 1`
//!   attempts before a retryable failure is surfaced. Permanent failures
//!   short-circuit immediately.
//!
//! Sleeping goes through the [`Sleeper`] trait; tests swap in a no-op.
//!
//! The fetcher has no side effects beyond the network call and its log
//! lines. It never touches run state.

use crate::error::{FailureKind, FetchError};
use crate::identity::IdentityRotator;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Raw markup of a successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub status: u16,
}

/// One failed attempt, already classified.
#[derive(Debug, Clone)]
pub struct AttemptError {
    pub kind: FailureKind,
    pub message: String,
}

/// A single fetch attempt. Implemented over HTTP in production and by
/// scripted fakes in tests.
#[async_trait]
pub trait FetchOnce: Send + Sync {
    async fn fetch_once(&self, url: &str, user_agent: &str) -> Result<FetchedPage, AttemptError>;
}

/// Clock seam for backoff and courtesy delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The fetching capability the rest of the pipeline consumes.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// [`FetchOnce`] over reqwest: 15 s timeout, per-attempt user-agent.
pub struct HttpFetchOnce {
    client: reqwest::Client,
}

impl HttpFetchOnce {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetchOnce {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchOnce for HttpFetchOnce {
    async fn fetch_once(&self, url: &str, user_agent: &str) -> Result<FetchedPage, AttemptError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AttemptError {
                kind: classify_transport_error(&e),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError {
                kind: classify_status(status.as_u16()),
                message: format!("unexpected status {status}"),
            });
        }

        // A connection dropped mid-body is as transient as a refused one.
        let body = response.text().await.map_err(|e| AttemptError {
            kind: FailureKind::Retryable,
            message: format!("reading body failed: {e}"),
        })?;

        Ok(FetchedPage {
            body,
            status: status.as_u16(),
        })
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FailureKind {
    if e.is_builder() {
        FailureKind::Permanent
    } else {
        // Timeouts, DNS, refused connections: all worth another try.
        FailureKind::Retryable
    }
}

fn classify_status(status: u16) -> FailureKind {
    match status {
        429 => FailureKind::Retryable,
        500..=599 => FailureKind::Retryable,
        _ => FailureKind::Permanent,
    }
}

/// Retry decorator around a [`FetchOnce`].
///
/// Each attempt draws a fresh identity from the rotator: a new
/// user-agent, and a randomized courtesy pause taken *before* the request
/// so the cadence of outbound traffic never looks machine-regular. On a
/// retryable failure the decorator backs off
/// `min(base * 2^attempt, 30 s)` before the next attempt; the rotator's
/// randomized pause doubles as backoff jitter.
pub struct RetryingFetcher<T> {
    inner: T,
    max_retries: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    rotator: IdentityRotator,
    sleeper: Box<dyn Sleeper>,
}

impl<T: FetchOnce> RetryingFetcher<T> {
    pub fn new(inner: T, max_retries: u32) -> Self {
        Self::with_sleeper(inner, max_retries, Box::new(TokioSleeper))
    }

    /// Construct with an explicit sleeper (tests pass a no-op).
    pub fn with_sleeper(inner: T, max_retries: u32, sleeper: Box<dyn Sleeper>) -> Self {
        Self {
            inner,
            max_retries,
            base_backoff: BASE_BACKOFF,
            max_backoff: MAX_BACKOFF,
            rotator: IdentityRotator::new(),
            sleeper,
        }
    }
}

#[async_trait]
impl<T: FetchOnce> PageFetcher for RetryingFetcher<T> {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if let Err(e) = Url::parse(url) {
            warn!(%url, error = %e, "Rejecting malformed URL without fetching");
            return Err(FetchError {
                url: url.to_string(),
                kind: FailureKind::Permanent,
                attempts: 0,
                message: format!("malformed URL: {e}"),
            });
        }

        for attempt in 0..=self.max_retries {
            let identity = self.rotator.next();
            debug!(%url, attempt, user_agent = identity.user_agent, "Starting fetch attempt");
            self.sleeper.sleep(identity.delay).await;

            match self.inner.fetch_once(url, identity.user_agent).await {
                Ok(page) => {
                    info!(%url, attempt, status = page.status, bytes = page.body.len(), "Fetch succeeded");
                    return Ok(page);
                }
                Err(e) if e.kind == FailureKind::Permanent => {
                    warn!(%url, attempt, error = %e.message, "Permanent fetch failure; not retrying");
                    return Err(FetchError {
                        url: url.to_string(),
                        kind: FailureKind::Permanent,
                        attempts: attempt + 1,
                        message: e.message,
                    });
                }
                Err(e) => {
                    if attempt == self.max_retries {
                        warn!(%url, attempt, error = %e.message, "Fetch exhausted retries");
                        return Err(FetchError {
                            url: url.to_string(),
                            kind: FailureKind::Retryable,
                            attempts: attempt + 1,
                            message: e.message,
                        });
                    }
                    // Doubling past 2^5 is moot under the 30 s cap.
                    let backoff = self
                        .base_backoff
                        .saturating_mul(1 << attempt.min(5))
                        .min(self.max_backoff);
                    warn!(%url, attempt, ?backoff, error = %e.message, "Fetch attempt failed; backing off");
                    self.sleeper.sleep(backoff).await;
                }
            }
        }

        unreachable!("retry loop always returns")
    }
}
