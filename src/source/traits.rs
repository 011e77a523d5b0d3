//! Data source trait and failure classification

use async_trait::async_trait;
use thiserror::Error;

/// Classified failure of a single data source request
///
/// The retry decision is made on the variant alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The request itself was refused or malformed (authentication, bad
    /// parameters, HTTP error status). Retrying cannot help.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Network-level failure (connection refused, timeout, broken body).
    #[error("connection error: {0}")]
    Connectivity(String),
}

impl SourceError {
    /// Whether the same request could plausibly succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// A remote provider answering one query per key
///
/// `K` is the predicate for one request: a chunk of catalog numbers or
/// days, or a SATCAT selection. Results must come back in a stable order so
/// that re-fetching the same key reproduces the same payload.
#[async_trait]
pub trait DataSource<K: ?Sized + Sync>: Send + Sync {
    /// Fetches the raw payload for `key`
    ///
    /// An empty payload means the provider has no records for `key`; it is
    /// not an error.
    async fn query(&self, key: &K) -> Result<String, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(SourceError::Connectivity("timed out".to_string()).is_transient());
        assert!(!SourceError::Rejected("HTTP 400".to_string()).is_transient());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SourceError::Rejected("HTTP 401".to_string()).to_string(),
            "request rejected: HTTP 401"
        );
        assert_eq!(
            SourceError::Connectivity("refused".to_string()).to_string(),
            "connection error: refused"
        );
    }
}
