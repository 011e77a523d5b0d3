//! Rate-limited, fault-tolerant bulk retrieval
//!
//! This module contains the retrieval engine:
//! - Request pacing against the provider's rate limit
//! - Bounded retry with exponential backoff
//! - The sequential chunk loop with its error budget
//! - Per-run counters and summary

mod orchestrator;
mod rate_limit;
mod retry;
mod session;

pub use orchestrator::{is_empty_payload, Harvester};
pub use rate_limit::RateLimiter;
pub use retry::{FetchOutcome, RetryingFetcher};
pub use session::{RetrievalSession, RetrievalSummary};

use crate::config::RetrievalConfig;

/// Builds a harvester paced and bounded by `config`
pub fn harvester<D>(source: D, config: &RetrievalConfig) -> Harvester<D> {
    let limiter = RateLimiter::new(config.min_interval());
    let fetcher = RetryingFetcher::new(source, limiter, config.max_retry);
    Harvester::new(fetcher, config.max_error)
}
