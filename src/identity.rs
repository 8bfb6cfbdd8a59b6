//! Identity rotation for outbound requests.
//!
//! Sites block scrapers that announce themselves with a constant
//! user-agent or request on a fixed interval. Before every outbound
//! request the pipeline draws a fresh [`Identity`]: a user-agent picked
//! uniformly from a small pool of realistic browser strings, and a
//! courtesy delay drawn from a bounded random range so the request
//! cadence never fingerprints as machine-regular.

use rand::{Rng, rng};
use std::time::Duration;

/// Realistic desktop and mobile browser user-agent strings.
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.212 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
];

const MIN_DELAY_MS: u64 = 1_500;
const MAX_DELAY_MS: u64 = 3_500;

/// One request's worth of identity: the user-agent header value and the
/// pause to take before sending.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_agent: &'static str,
    pub delay: Duration,
}

/// Draws a fresh [`Identity`] per request.
///
/// Stateless apart from randomness, so it is safe to call before every
/// outbound request, including each retry of the same URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRotator;

impl IdentityRotator {
    pub fn new() -> Self {
        Self
    }

    /// Draw a user-agent and an inter-request delay (1.5–3.5 s).
    pub fn next(&self) -> Identity {
        let mut r = rng();
        Identity {
            user_agent: USER_AGENTS[r.random_range(0..USER_AGENTS.len())],
            delay: Duration::from_millis(r.random_range(MIN_DELAY_MS..=MAX_DELAY_MS)),
        }
    }
}
