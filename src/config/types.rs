use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for gp-harvest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(rename = "space-track", default)]
    pub space_track: SpaceTrackConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Space-Track account and endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceTrackConfig {
    /// Account identity (the login e-mail address)
    #[serde(default)]
    pub identity: String,

    /// Account password
    #[serde(default)]
    pub password: String,

    /// Base URL of the Space-Track API
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for SpaceTrackConfig {
    fn default() -> Self {
        Self {
            identity: String::new(),
            password: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Pacing, retry and error budget configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum time between consecutive requests (milliseconds)
    #[serde(rename = "min-interval-ms", default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Retries after the initial attempt for a single chunk
    #[serde(rename = "max-retry", default = "default_max_retry")]
    pub max_retry: u32,

    /// Number of failed chunks that aborts the run
    #[serde(rename = "max-error", default = "default_max_error")]
    pub max_error: u32,
}

impl RetrievalConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_retry: default_max_retry(),
            max_error: default_max_error(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory that receives one file per chunk
    #[serde(rename = "download-dir", default = "default_download_dir")]
    pub download_dir: String,

    /// Directory for per-invocation debug log files
    #[serde(rename = "log-dir", default = "default_log_dir")]
    pub log_dir: String,

    /// Gzip downloaded files
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Replace files left by a previous run
    #[serde(default)]
    pub overwrite: bool,

    /// Payload format requested from the provider
    #[serde(default)]
    pub format: PayloadFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            log_dir: default_log_dir(),
            compress: true,
            overwrite: false,
            format: PayloadFormat::default(),
        }
    }
}

/// Payload format returned by the provider and written by the sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PayloadFormat {
    #[default]
    Json,
    Csv,
}

impl PayloadFormat {
    /// Value of the `format` query parameter, also used as file extension
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }
}

fn default_base_url() -> String {
    "https://www.space-track.org".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    30
}

// 30 requests per minute / 300 requests per hour
fn default_min_interval_ms() -> u64 {
    12_000
}

fn default_max_retry() -> u32 {
    2
}

fn default_max_error() -> u32 {
    3
}

fn default_download_dir() -> String {
    "download".to_string()
}

fn default_log_dir() -> String {
    "log".to_string()
}

fn default_true() -> bool {
    true
}
