//! gp-harvest: a polite bulk downloader for Space-Track orbital data
//!
//! This crate retrieves GP history, legacy TLE and SATCAT records from a
//! rate-limited provider, one request per chunk of a catalog-number or date
//! range, and persists each chunk to its own file.

pub mod config;
pub mod logging;
pub mod range;
pub mod retrieval;
pub mod sink;
pub mod source;

use thiserror::Error;

/// Main error type for gp-harvest setup operations
///
/// Per-chunk failures never surface here; they are counted by the
/// retrieval session instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Range error: {0}")]
    Range(#[from] RangeError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid output path: {}", .0.display())]
    OutputPath(std::path::PathBuf),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing Space-Track credentials: set [space-track] identity/password or SPACETRACK_IDENTITY/SPACETRACK_PASSWORD")]
    MissingCredentials,
}

/// Range and partitioning errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Chunk size must be at least 1")]
    ZeroUnit,

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Result type alias for gp-harvest setup operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use config::Config;
pub use range::{partition, CatalogRange, Chunk, ChunkKey};
pub use retrieval::{FetchOutcome, Harvester, RateLimiter, RetrievalSummary, RetryingFetcher};
pub use sink::{FileSink, Sink};
pub use source::{DataSource, SourceError, SpaceTrackClient};
