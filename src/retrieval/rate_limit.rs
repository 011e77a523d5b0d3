//! Request pacing against the provider's hard rate limit
//!
//! The provider rejects clients that exceed its quota outright, so requests
//! are spaced proactively. Retrieval is strictly sequential; one timestamp is
//! all the state needed.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Enforces a minimum interval between consecutive requests
///
/// Built on `tokio::time`, so tests can drive it with a paused clock.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Minimum spacing between the starts of two requests
    min_interval: Duration,

    /// When the previous request was let through
    last_request: Option<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time remaining before the next request may start
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_request?;
        let elapsed = now.saturating_duration_since(last);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }

    /// Waits until `min_interval` has passed since the previous request,
    /// then records a new request
    ///
    /// The first call never waits.
    pub async fn wait_turn(&mut self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::trace!("Rate limit: waiting {:.3} secs", wait.as_secs_f64());
            sleep(wait).await;
        }
        self.record_request();
    }

    /// Backoff delay before retry `attempt` (1-based): `min_interval * 2^attempt`
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.min_interval
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Sleeps the backoff delay for retry `attempt`, then records a new
    /// request
    ///
    /// The backoff is always at least twice the minimum interval, so the
    /// base pacing holds without consulting the last timestamp.
    pub async fn backoff(&mut self, attempt: u32) {
        let delay = self.backoff_delay(attempt);
        tracing::debug!("Sleep: {:.3} secs", delay.as_secs_f64());
        sleep(delay).await;
        self.record_request();
    }

    fn record_request(&mut self) {
        self.last_request = Some(Instant::now());
    }
}
