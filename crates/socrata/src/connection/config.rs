//! Connection configuration.

use std::fmt;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Credentials;
use crate::{Error, Result};

/// Largest page the platform will serve for a single GET.
pub const ABSOLUTE_MAXIMUM_CHUNK_SIZE: usize = 1000;

/// Configuration for a [`Connection`](super::Connection).
///
/// The `Debug` implementation masks the password and app token.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ConnectionConfig {
    /// Base URL of the data portal, e.g. `https://data.example.gov`
    #[cfg_attr(feature = "config", arg(long = "base-url", env = "SOCRATA_BASE_URL"))]
    pub base_url: String,

    /// Application token sent as `X-App-Token`
    #[cfg_attr(
        feature = "config",
        arg(long = "app-token", env = "SOCRATA_APP_TOKEN", hide_env_values = true)
    )]
    #[serde(default)]
    pub app_token: Option<String>,

    /// Username for HTTP basic authentication
    #[cfg_attr(feature = "config", arg(long = "username", env = "SOCRATA_USERNAME"))]
    #[serde(default)]
    pub username: Option<String>,

    /// Password for HTTP basic authentication
    #[cfg_attr(
        feature = "config",
        arg(long = "password", env = "SOCRATA_PASSWORD", hide_env_values = true)
    )]
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum number of rows requested per page (1-1000)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "max-chunk-size",
            env = "SOCRATA_MAX_CHUNK_SIZE",
            default_value_t = ABSOLUTE_MAXIMUM_CHUNK_SIZE
        )
    )]
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Refuse every mutating request
    #[cfg_attr(feature = "config", arg(long = "read-only", env = "SOCRATA_READ_ONLY"))]
    #[serde(default)]
    pub read_only: bool,
}

fn default_max_chunk_size() -> usize {
    ABSOLUTE_MAXIMUM_CHUNK_SIZE
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("base_url", &self.base_url)
            .field("app_token", &self.app_token.as_ref().map(|_| "***REDACTED***"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***REDACTED***"))
            .field("max_chunk_size", &self.max_chunk_size)
            .field("read_only", &self.read_only)
            .finish()
    }
}

impl ConnectionConfig {
    /// Creates a configuration for the given portal with default settings.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_token: None,
            username: None,
            password: None,
            max_chunk_size: default_max_chunk_size(),
            read_only: false,
        }
    }

    /// Set the application token.
    #[must_use]
    pub fn with_app_token(mut self, app_token: impl Into<String>) -> Self {
        self.app_token = Some(app_token.into());
        self
    }

    /// Set basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the maximum page size.
    #[must_use]
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Mark the connection read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns the credentials when both username and password are non-empty.
    pub fn credentials(&self) -> Option<Credentials> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Credentials::new(username, password))
            }
            _ => None,
        }
    }

    /// Returns the app token unless it is empty.
    pub fn effective_app_token(&self) -> Option<&str> {
        self.app_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Parses the base URL.
    pub fn parsed_base_url(&self) -> Result<Url> {
        if self.base_url.is_empty() {
            return Err(Error::configuration().with_message("base_url cannot be empty"));
        }

        Url::parse(&self.base_url).map_err(|e| {
            Error::from_source(crate::ErrorKind::Configuration, e)
                .with_message(format!("Invalid base_url '{}'", self.base_url))
        })
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.max_chunk_size == 0 || self.max_chunk_size > ABSOLUTE_MAXIMUM_CHUNK_SIZE {
            return Err(Error::configuration().with_message(format!(
                "max_chunk_size ({}) must be between 1 and {ABSOLUTE_MAXIMUM_CHUNK_SIZE}",
                self.max_chunk_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_new_config() {
        let config = ConnectionConfig::new("https://data.example.gov");
        assert_eq!(config.max_chunk_size, ABSOLUTE_MAXIMUM_CHUNK_SIZE);
        assert!(!config.read_only);
        assert!(config.credentials().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let error = ConnectionConfig::new("not a valid url").validate().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);

        let error = ConnectionConfig::new("").validate().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_max_chunk_size_bounds() {
        let config = ConnectionConfig::new("https://data.example.gov");
        assert!(config.clone().with_max_chunk_size(1000).validate().is_ok());
        assert!(config.clone().with_max_chunk_size(1001).validate().is_err());
        assert!(config.with_max_chunk_size(0).validate().is_err());
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let config = ConnectionConfig::new("https://data.example.gov").with_credentials("me", "");
        assert!(config.credentials().is_none());

        let config = config.with_credentials("me", "secret");
        let credentials = config.credentials().unwrap();
        assert_eq!(credentials.username(), "me");
        assert_eq!(credentials.password(), "secret");
    }

    #[test]
    fn test_secrets_masked_in_debug() {
        let config = ConnectionConfig::new("https://data.example.gov")
            .with_app_token("tok_super_secret")
            .with_credentials("me", "hunter2");

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("tok_super_secret"));
        assert!(!debug_output.contains("hunter2"));
        assert!(debug_output.contains("REDACTED"));
        assert!(debug_output.contains("me"));
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"base_url": "https://data.example.gov"}"#).unwrap();
        assert_eq!(config.max_chunk_size, ABSOLUTE_MAXIMUM_CHUNK_SIZE);
        assert!(config.app_token.is_none());
        assert!(!config.read_only);
    }
}
