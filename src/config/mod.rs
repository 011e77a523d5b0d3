//! Configuration module for gp-harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, with credential overrides from the environment.
//!
//! # Example
//!
//! ```no_run
//! use gp_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("gp-harvest.toml")).unwrap();
//! println!("Requests are spaced {}ms apart", config.retrieval.min_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, PayloadFormat, RetrievalConfig, SpaceTrackConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    load_offline_config, parse_config, IDENTITY_ENV, PASSWORD_ENV,
};
