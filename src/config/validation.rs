use crate::config::types::{Config, OutputConfig, RetrievalConfig, SpaceTrackConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_credentials(&config.space_track)?;
    validate_settings(config)
}

/// Validates everything except the account credentials
///
/// Enough for runs that never contact the provider.
pub fn validate_settings(config: &Config) -> Result<(), ConfigError> {
    validate_space_track_config(&config.space_track)?;
    validate_retrieval_config(&config.retrieval)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_credentials(config: &SpaceTrackConfig) -> Result<(), ConfigError> {
    if config.identity.trim().is_empty() || config.password.is_empty() {
        return Err(ConfigError::MissingCredentials);
    }
    Ok(())
}

/// Validates endpoint configuration
fn validate_space_track_config(config: &SpaceTrackConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use HTTP or HTTPS",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates pacing and budget configuration
fn validate_retrieval_config(config: &RetrievalConfig) -> Result<(), ConfigError> {
    if config.min_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "min-interval-ms must be >= 100ms, got {}ms",
            config.min_interval_ms
        )));
    }

    // 2^10 backoff multiplier is already hours at the default interval
    if config.max_retry > 10 {
        return Err(ConfigError::Validation(format!(
            "max-retry must be <= 10, got {}",
            config.max_retry
        )));
    }

    if config.max_error < 1 {
        return Err(ConfigError::Validation(format!(
            "max-error must be >= 1, got {}",
            config.max_error
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.download_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "download-dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
