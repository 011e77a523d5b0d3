use crate::config::types::Config;
use crate::config::validation::{validate, validate_settings};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable overriding `[space-track] identity`
pub const IDENTITY_ENV: &str = "SPACETRACK_IDENTITY";

/// Environment variable overriding `[space-track] password`
pub const PASSWORD_ENV: &str = "SPACETRACK_PASSWORD";

/// Loads and parses a configuration file from the given path
///
/// Credentials from `SPACETRACK_IDENTITY` and `SPACETRACK_PASSWORD` take
/// precedence over the file. A missing file is accepted so that a run can be
/// configured from the environment alone; validation still requires
/// credentials.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use gp_harvest::config::load_config;
///
/// let config = load_config(Path::new("gp-harvest.toml")).unwrap();
/// println!("Max retry: {}", config.retrieval.max_retry);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration for a run that never contacts the provider
///
/// Same as [`load_config`] except that credentials may be absent.
pub fn load_offline_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate_settings(&config)?;
    Ok(config)
}

/// Reads the file (or defaults) and applies the environment overrides
fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        parse_config(&content)?
    } else {
        tracing::debug!("Config file {} not found, using defaults", path.display());
        Config::default()
    };

    let config = apply_env_overrides(
        config,
        std::env::var(IDENTITY_ENV).ok(),
        std::env::var(PASSWORD_ENV).ok(),
    );

    Ok(config)
}

/// Parses TOML configuration text without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Replaces the configured credentials with the given non-empty values
pub fn apply_env_overrides(
    mut config: Config,
    identity: Option<String>,
    password: Option<String>,
) -> Config {
    if let Some(identity) = identity.filter(|s| !s.is_empty()) {
        config.space_track.identity = identity;
    }
    if let Some(password) = password.filter(|s| !s.is_empty()) {
        config.space_track.password = password;
    }
    config
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and the file hash
///
/// The hash is `None` when the configuration came from defaults and the
/// environment only. With `require_credentials` off the account check is
/// skipped, as in [`load_offline_config`].
pub fn load_config_with_hash(
    path: &Path,
    require_credentials: bool,
) -> Result<(Config, Option<String>), ConfigError> {
    let config = if require_credentials {
        load_config(path)?
    } else {
        load_offline_config(path)?
    };
    let hash = if path.exists() {
        Some(compute_config_hash(path)?)
    } else {
        None
    };
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PayloadFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let config_content = r#"
[space-track]
identity = "user@example.com"
password = "secret"
base-url = "https://mirror.example.com"
timeout-secs = 60
connect-timeout-secs = 5

[retrieval]
min-interval-ms = 2000
max-retry = 4
max-error = 10

[output]
download-dir = "./data"
log-dir = "./logs"
compress = false
overwrite = true
format = "csv"
"#;

        let config = parse_config(config_content).unwrap();

        assert_eq!(config.space_track.identity, "user@example.com");
        assert_eq!(config.space_track.base_url, "https://mirror.example.com");
        assert_eq!(config.space_track.timeout_secs, 60);
        assert_eq!(config.retrieval.min_interval_ms, 2000);
        assert_eq!(config.retrieval.max_retry, 4);
        assert_eq!(config.retrieval.max_error, 10);
        assert_eq!(config.output.download_dir, "./data");
        assert!(!config.output.compress);
        assert!(config.output.overwrite);
        assert_eq!(config.output.format, PayloadFormat::Csv);
    }

    #[test]
    fn test_defaults_match_provider_quota() {
        let config = parse_config("[space-track]\nidentity = \"a\"\npassword = \"b\"\n").unwrap();

        assert_eq!(config.space_track.base_url, "https://www.space-track.org");
        assert_eq!(config.retrieval.min_interval_ms, 12_000);
        assert_eq!(config.retrieval.max_retry, 2);
        assert_eq!(config.retrieval.max_error, 3);
        assert_eq!(config.output.download_dir, "download");
        assert!(config.output.compress);
        assert!(!config.output.overwrite);
        assert_eq!(config.output.format, PayloadFormat::Json);
    }

    #[test]
    fn test_env_overrides_replace_credentials() {
        let config = parse_config("[space-track]\nidentity = \"file\"\npassword = \"file\"\n").unwrap();
        let config = apply_env_overrides(config, Some("env-user".to_string()), None);

        assert_eq!(config.space_track.identity, "env-user");
        assert_eq!(config.space_track.password, "file");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = parse_config("[space-track]\nidentity = \"file\"\npassword = \"file\"\n").unwrap();
        let config = apply_env_overrides(config, Some(String::new()), Some(String::new()));

        assert_eq!(config.space_track.identity, "file");
        assert_eq!(config.space_track.password, "file");
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[space-track]
identity = "user@example.com"
password = "secret"

[retrieval]
max-error = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_offline_config_needs_no_credentials() {
        let file = create_temp_config("[output]\ndownload-dir = \"plan\"\n");

        let config = load_offline_config(file.path()).unwrap();
        assert_eq!(config.output.download_dir, "plan");

        let (config, hash) = load_config_with_hash(file.path(), false).unwrap();
        assert_eq!(config.output.download_dir, "plan");
        assert!(hash.is_some());
    }

    #[test]
    fn test_offline_config_still_validates_settings() {
        let file = create_temp_config("[retrieval]\nmin-interval-ms = 1\n");
        let result = load_offline_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
