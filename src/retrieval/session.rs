//! Per-run counters and the final summary

use std::time::Duration;
use tokio::time::Instant;

/// Mutable counters for one retrieval run
///
/// Lives for a single invocation; files already on disk are the only state
/// that survives it.
#[derive(Debug)]
pub struct RetrievalSession {
    files_written: u64,
    bytes_written: u64,
    error_count: u32,
    requests_attempted: u64,
    started: Instant,
}

impl RetrievalSession {
    pub fn new() -> Self {
        Self {
            files_written: 0,
            bytes_written: 0,
            error_count: 0,
            requests_attempted: 0,
            started: Instant::now(),
        }
    }

    pub fn record_attempt(&mut self) {
        self.requests_attempted += 1;
    }

    /// Counts a downloaded payload headed for the sink
    pub fn record_download(&mut self, bytes: usize) {
        self.files_written += 1;
        self.bytes_written += bytes as u64;
    }

    pub fn record_error(&mut self) {
        self.error_count += 1;
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn budget_exhausted(&self, max_error: u32) -> bool {
        self.error_count >= max_error
    }

    /// Closes the session and logs the summary lines
    pub fn finish(self, requests_total: u64, aborted: bool) -> RetrievalSummary {
        let summary = RetrievalSummary {
            files_written: self.files_written,
            bytes_written: self.bytes_written,
            error_count: self.error_count,
            requests_attempted: self.requests_attempted,
            requests_total,
            aborted,
            elapsed: self.started.elapsed(),
        };

        if summary.error_count > 0 {
            tracing::error!("The number of errors is {}", summary.error_count);
        }
        if summary.aborted {
            tracing::error!(
                "Skipped {} of {} requests",
                summary.requests_total - summary.requests_attempted,
                summary.requests_total
            );
        }
        tracing::info!(
            "Downloaded: {} files, {} bytes in {} sec",
            summary.files_written,
            summary.bytes_written,
            summary.elapsed.as_secs()
        );

        summary
    }
}

impl Default for RetrievalSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a whole retrieval run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalSummary {
    /// Non-empty payloads handed to the sink
    pub files_written: u64,
    /// Total size of those payloads
    pub bytes_written: u64,
    /// Failed fetches plus failed writes
    pub error_count: u32,
    /// Requests started before the run ended
    pub requests_attempted: u64,
    /// Requests planned for the run
    pub requests_total: u64,
    /// The error budget stopped the run early
    pub aborted: bool,
    pub elapsed: Duration,
}

impl RetrievalSummary {
    /// True when every planned request succeeded
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }
}
