//! Bulk retrieval orchestration - the main chunk loop
//!
//! For every chunk of the requested range, in order and one at a time:
//! - fetch through the retrying, rate-limited fetcher
//! - hand non-empty payloads to the sink
//! - update the session counters
//! - stop once the error budget is spent

use crate::range::{partition, CatalogRange, ChunkKey, RangeElement};
use crate::retrieval::{FetchOutcome, RetrievalSession, RetrievalSummary, RetryingFetcher};
use crate::sink::Sink;
use crate::source::DataSource;
use crate::RangeError;
use std::fmt;

/// Drives a retrieval run against one data source
pub struct Harvester<D> {
    fetcher: RetryingFetcher<D>,
    max_error: u32,
}

impl<D> Harvester<D> {
    /// Creates a harvester that aborts once `max_error` requests have failed
    pub fn new(fetcher: RetryingFetcher<D>, max_error: u32) -> Self {
        Self { fetcher, max_error }
    }

    pub fn fetcher(&self) -> &RetryingFetcher<D> {
        &self.fetcher
    }

    pub fn max_error(&self) -> u32 {
        self.max_error
    }

    /// Downloads every chunk of `range` into `sink`
    ///
    /// Chunk failures are counted and logged, never returned. The only error
    /// is an invalid chunk size, detected before any request is made.
    ///
    /// # Arguments
    ///
    /// * `range` - Catalog numbers or days to download
    /// * `unit` - Elements per request
    /// * `sink` - Destination for the payloads
    ///
    /// # Returns
    ///
    /// * `Ok(RetrievalSummary)` - The run finished or hit the error budget
    /// * `Err(RangeError)` - `unit` was zero
    pub async fn run<T, S>(
        &mut self,
        range: &CatalogRange<T>,
        unit: u64,
        sink: &mut S,
    ) -> Result<RetrievalSummary, RangeError>
    where
        T: RangeElement,
        D: DataSource<ChunkKey<T>>,
        S: Sink + ?Sized,
    {
        let chunks = partition(range, unit)?;
        let total = chunks.total();

        tracing::info!("Start: {}", range.start());
        tracing::info!("End: {}", range.end());
        tracing::info!("Number of {}: {}", T::UNIT_NAME, range.len());
        tracing::info!("Number of files: {}", total);

        let mut session = RetrievalSession::new();
        let mut aborted = false;

        for chunk in chunks {
            tracing::info!("Downloading {} ({}/{})", chunk.key, chunk.index, chunk.total);

            self.retrieve(&mut session, &chunk.key, &chunk.target_name(), sink)
                .await;

            if session.budget_exhausted(self.max_error) {
                tracing::error!(
                    "The number of errors reached the maximum error count ({})",
                    self.max_error
                );
                aborted = chunk.index < total;
                break;
            }
        }

        Ok(session.finish(total, aborted))
    }

    /// Downloads a single, unpartitioned request into `sink` as `target`
    pub async fn run_single<K, S>(&mut self, key: &K, target: &str, sink: &mut S) -> RetrievalSummary
    where
        K: fmt::Display + Sync + ?Sized,
        D: DataSource<K>,
        S: Sink + ?Sized,
    {
        tracing::info!("Downloading {}", key);

        let mut session = RetrievalSession::new();
        self.retrieve(&mut session, key, target, sink).await;
        session.finish(1, false)
    }

    /// Fetches one key and persists its payload, updating the session
    async fn retrieve<K, S>(
        &mut self,
        session: &mut RetrievalSession,
        key: &K,
        target: &str,
        sink: &mut S,
    ) where
        K: fmt::Display + Sync + ?Sized,
        D: DataSource<K>,
        S: Sink + ?Sized,
    {
        session.record_attempt();

        match self.fetcher.fetch(key).await {
            FetchOutcome::Success(payload) if is_empty_payload(&payload) => {
                tracing::info!("No data for {}", key);
            }
            FetchOutcome::Success(payload) => {
                session.record_download(payload.len());
                if !sink.persist(&payload, target) {
                    tracing::error!("Failed to save data for {}", key);
                    session.record_error();
                }
            }
            FetchOutcome::TransientFailure(_) | FetchOutcome::PermanentFailure(_) => {
                tracing::error!("Failed to download data for {}", key);
                session.record_error();
            }
        }
    }
}

/// A successful response carrying no records: a blank body, or an empty
/// JSON array
pub fn is_empty_payload(payload: &str) -> bool {
    let trimmed = payload.trim();
    trimmed.is_empty() || trimmed == "[]"
}
