//! Space-Track HTTP client
//!
//! This module handles all requests to the provider, including:
//! - Building the HTTP client with a cookie store for the login session
//! - Logging in lazily before the first query
//! - Building query paths for each request class
//! - Classifying reqwest failures as rejected or transient

use crate::config::{PayloadFormat, SpaceTrackConfig};
use crate::range::ChunkKey;
use crate::source::query::{
    catalog_query_path, date_query_path, satcat_query_path, DateField, IdClass, SatcatSelection,
};
use crate::source::{DataSource, SourceError};
use crate::ConfigError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

const LOGIN_PATH: &str = "ajaxauth/login";

/// Builds an HTTP client for the provider
///
/// The cookie store keeps the session cookie issued at login.
pub fn build_http_client(config: &SpaceTrackConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("gp-harvest/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .cookie_store(true)
        .gzip(true)
        .build()
}

/// Client for the Space-Track `basicspacedata` API
pub struct SpaceTrackClient {
    client: Client,
    base_url: Url,
    identity: String,
    password: String,
    format: PayloadFormat,
    id_class: IdClass,
    date_field: DateField,
    session: OnceCell<()>,
}

impl SpaceTrackClient {
    /// Creates a client; no request is sent until the first query
    ///
    /// # Arguments
    ///
    /// * `config` - Account and endpoint configuration
    /// * `format` - Payload format requested for every query
    pub fn new(config: &SpaceTrackConfig, format: PayloadFormat) -> crate::Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;
        let client = build_http_client(config)?;

        Ok(Self {
            client,
            base_url,
            identity: config.identity.clone(),
            password: config.password.clone(),
            format,
            id_class: IdClass::default(),
            date_field: DateField::default(),
            session: OnceCell::new(),
        })
    }

    /// Selects the request class used for catalog-number chunks
    pub fn with_id_class(mut self, id_class: IdClass) -> Self {
        self.id_class = id_class;
        self
    }

    /// Selects the timestamp field used for date chunks
    pub fn with_date_field(mut self, date_field: DateField) -> Self {
        self.date_field = date_field;
        self
    }

    pub fn format(&self) -> PayloadFormat {
        self.format
    }

    fn endpoint(&self, path: &str) -> Result<Url, SourceError> {
        self.base_url
            .join(path)
            .map_err(|e| SourceError::Rejected(format!("invalid request path {}: {}", path, e)))
    }

    /// Logs in once per client; a failed login is attempted again on the
    /// next query
    async fn ensure_session(&self) -> Result<(), SourceError> {
        self.session.get_or_try_init(|| self.login()).await?;
        Ok(())
    }

    async fn login(&self) -> Result<(), SourceError> {
        let url = self.endpoint(LOGIN_PATH)?;
        tracing::debug!("Logging in to {} as {}", url, self.identity);

        let response = self
            .client
            .post(url)
            .form(&[
                ("identity", self.identity.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify_error)?;

        let body = response.text().await.map_err(classify_error)?;
        if login_failed(&body) {
            return Err(SourceError::Rejected(
                "login failed, check identity and password".to_string(),
            ));
        }

        Ok(())
    }

    /// Sends one GET query and returns the body text
    async fn get(&self, path: &str) -> Result<String, SourceError> {
        self.ensure_session().await?;

        let url = self.endpoint(path)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify_error)?;

        response.text().await.map_err(classify_error)
    }
}

#[async_trait]
impl DataSource<ChunkKey<u32>> for SpaceTrackClient {
    async fn query(&self, key: &ChunkKey<u32>) -> Result<String, SourceError> {
        self.get(&catalog_query_path(self.id_class, key, self.format))
            .await
    }
}

#[async_trait]
impl DataSource<ChunkKey<NaiveDate>> for SpaceTrackClient {
    async fn query(&self, key: &ChunkKey<NaiveDate>) -> Result<String, SourceError> {
        let path = date_query_path(self.date_field, key, self.format)?;
        self.get(&path).await
    }
}

#[async_trait]
impl DataSource<SatcatSelection> for SpaceTrackClient {
    async fn query(&self, key: &SatcatSelection) -> Result<String, SourceError> {
        self.get(&satcat_query_path(key, self.format)).await
    }
}

/// Maps a reqwest failure onto the retry classification
///
/// | Condition | Classification |
/// |-----------|----------------|
/// | HTTP error status | Rejected |
/// | Timeout | Connectivity |
/// | Connection refused / reset | Connectivity |
/// | Body read or decode failure | Connectivity |
/// | Anything else (builder, redirect) | Rejected |
pub fn classify_error(error: reqwest::Error) -> SourceError {
    if let Some(status) = error.status() {
        return SourceError::Rejected(format!("HTTP {}", status));
    }

    if error.is_timeout() {
        SourceError::Connectivity(format!("request timeout: {}", error))
    } else if error.is_connect() || error.is_request() || error.is_body() || error.is_decode() {
        SourceError::Connectivity(error.to_string())
    } else {
        SourceError::Rejected(error.to_string())
    }
}

/// The login endpoint answers `{"Login":"Failed"}` with status 200 on bad
/// credentials
fn login_failed(body: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("Login")
                .and_then(|v| v.as_str())
                .map(|s| s.eq_ignore_ascii_case("failed"))
        })
        .unwrap_or(false)
}
