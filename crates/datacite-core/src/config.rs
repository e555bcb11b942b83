//! Process-wide configuration for DataCite clients.
//!
//! The configuration carries the contact email sent with every request and
//! the API root URL. A single mutable instance is shared across the process;
//! it is read whenever a URL is built or a request is sent, so changes apply
//! to everything built afterwards but never to URLs that already exist.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::sync::{LazyLock, RwLock};
use url::Url;
use validator::Validate;

/// Default DataCite REST API root.
pub const DEFAULT_API_URL: &str = "https://api.datacite.org";

static GLOBAL_CONFIG: LazyLock<RwLock<DataCiteConfig>> =
    LazyLock::new(|| RwLock::new(DataCiteConfig::default()));

/// Configuration shared by all DataCite collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DataCiteConfig {
    /// Contact email sent in the `email` request header
    #[validate(email)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// API root URL
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl DataCiteConfig {
    /// Create a configuration pointing at the given API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            email: None,
            api_url: api_url.into(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Set the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The API root with any trailing slash removed.
    #[must_use]
    pub fn api_root(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Parse and validate the API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_api_url(&self) -> Result<Url, Error> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::ConfigError(format!("Invalid API URL: {e}")))
    }
}

impl Default for DataCiteConfig {
    fn default() -> Self {
        Self {
            email: None,
            api_url: default_api_url(),
        }
    }
}

/// Snapshot of the process-wide configuration.
#[must_use]
pub fn config() -> DataCiteConfig {
    match GLOBAL_CONFIG.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide configuration after validating it.
///
/// # Errors
///
/// Returns an error if the new configuration fails validation; the current
/// configuration is left untouched in that case.
pub fn update_config<F>(update: F) -> Result<DataCiteConfig, Error>
where
    F: FnOnce(&mut DataCiteConfig),
{
    let mut guard = match GLOBAL_CONFIG.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    let mut candidate = guard.clone();
    update(&mut candidate);
    candidate.validate()?;

    tracing::debug!(api_url = %candidate.api_url, email = ?candidate.email, "DataCite configuration updated");
    *guard = candidate.clone();
    Ok(candidate)
}

/// Set or clear the process-wide contact email.
///
/// # Errors
///
/// Returns an error if the email is not a valid address.
pub fn set_email(email: Option<String>) -> Result<DataCiteConfig, Error> {
    update_config(|config| config.email = email)
}

/// Set the process-wide API root URL.
///
/// # Errors
///
/// Returns an error if the URL is invalid.
pub fn set_api_url(api_url: impl Into<String>) -> Result<DataCiteConfig, Error> {
    let api_url = api_url.into();
    update_config(|config| config.api_url = api_url)
}
