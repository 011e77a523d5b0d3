//! Bounded retry with exponential backoff around a single request

use crate::retrieval::RateLimiter;
use crate::source::{DataSource, SourceError};
use std::fmt;
use tokio::time::Instant;

/// Result of fetching one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The provider answered; the payload may be empty
    Success(String),

    /// Every attempt failed at the network level; carries the last error
    TransientFailure(SourceError),

    /// The provider refused the request; no retries were made after it
    PermanentFailure(SourceError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The payload, or None for either kind of failure
    pub fn into_payload(self) -> Option<String> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::TransientFailure(_) | Self::PermanentFailure(_) => None,
        }
    }
}

/// Fetches keys from a data source with pacing and bounded retries
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Success (even empty) | Return immediately |
/// | `SourceError::Rejected` | Return `PermanentFailure`, no retry |
/// | `SourceError::Connectivity` | Retry after `min_interval * 2^attempt` |
/// | `max_retry` retries failed | Return `TransientFailure` |
pub struct RetryingFetcher<D> {
    source: D,
    limiter: RateLimiter,
    max_retry: u32,
}

impl<D> RetryingFetcher<D> {
    /// Creates a fetcher issuing at most `max_retry + 1` requests per key
    pub fn new(source: D, limiter: RateLimiter, max_retry: u32) -> Self {
        Self {
            source,
            limiter,
            max_retry,
        }
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    pub fn min_interval(&self) -> std::time::Duration {
        self.limiter.min_interval()
    }

    /// Fetches `key`, retrying transient failures
    ///
    /// The first attempt waits for its turn on the rate limiter; each retry
    /// sleeps an exponential backoff instead. Every attempt logs its response
    /// time.
    pub async fn fetch<K>(&mut self, key: &K) -> FetchOutcome
    where
        D: DataSource<K>,
        K: fmt::Display + Sync + ?Sized,
    {
        let mut attempt = 0;

        loop {
            if attempt == 0 {
                self.limiter.wait_turn().await;
            } else {
                tracing::warn!("Retry {}/{} for {}", attempt, self.max_retry, key);
                self.limiter.backoff(attempt).await;
            }

            let started = Instant::now();
            let result = self.source.query(key).await;
            tracing::debug!(
                "Response time: {:.3} secs",
                started.elapsed().as_secs_f64()
            );

            match result {
                Ok(payload) => return FetchOutcome::Success(payload),
                Err(error) if error.is_transient() => {
                    tracing::warn!("{} ({})", error, key);
                    if attempt >= self.max_retry {
                        return FetchOutcome::TransientFailure(error);
                    }
                    attempt += 1;
                }
                Err(error) => {
                    tracing::error!("{} ({})", error, key);
                    return FetchOutcome::PermanentFailure(error);
                }
            }
        }
    }
}
