//! HTTP settings for talking to a data portal.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::transport::Method;

/// Default timeout for reads: 30 seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Default timeout for upserts and replaces: 2 minutes.
///
/// A write of a full chunk is processed row by row on the portal before it
/// answers, so it routinely outlasts a page read.
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 120;

/// HTTP settings for [`ReqwestClient`](super::ReqwestClient).
///
/// Reads (GET, DELETE) and writes (POST, PUT) get separate timeouts.
/// Portals log and throttle by user agent as well as by app token, so the
/// default agent names this library and its version; set your own to make
/// a sync job recognisable in the portal's access logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ReqwestConfig {
    /// Timeout in seconds for reads (0 uses the default)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "http-timeout",
            env = "SOCRATA_HTTP_TIMEOUT",
            default_value_t = DEFAULT_READ_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_read_timeout")]
    pub http_timeout: u64,

    /// Timeout in seconds for upserts and replaces (0 uses the default)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "write-timeout",
            env = "SOCRATA_WRITE_TIMEOUT",
            default_value_t = DEFAULT_WRITE_TIMEOUT_SECS
        )
    )]
    #[serde(default = "default_write_timeout")]
    pub write_timeout: u64,

    /// User-Agent reported to the portal
    #[cfg_attr(feature = "config", arg(long = "user-agent", env = "SOCRATA_USER_AGENT"))]
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_read_timeout() -> u64 {
    DEFAULT_READ_TIMEOUT_SECS
}

fn default_write_timeout() -> u64 {
    DEFAULT_WRITE_TIMEOUT_SECS
}

impl Default for ReqwestConfig {
    fn default() -> Self {
        Self {
            http_timeout: DEFAULT_READ_TIMEOUT_SECS,
            write_timeout: DEFAULT_WRITE_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ReqwestConfig {
    /// Timeout for reads.
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(non_zero_or(self.http_timeout, DEFAULT_READ_TIMEOUT_SECS))
    }

    /// Timeout for upserts and replaces.
    pub fn effective_write_timeout(&self) -> Duration {
        Duration::from_secs(non_zero_or(self.write_timeout, DEFAULT_WRITE_TIMEOUT_SECS))
    }

    /// Timeout applied to a request with `method`.
    pub fn timeout_for(&self, method: Method) -> Duration {
        match method {
            Method::Post | Method::Put => self.effective_write_timeout(),
            Method::Get | Method::Delete => self.effective_timeout(),
        }
    }

    /// User agent sent to the portal; `socrata-rs/<version>` unless a
    /// non-empty one is set.
    pub fn effective_user_agent(&self) -> String {
        match self.user_agent.as_deref() {
            Some(agent) if !agent.is_empty() => agent.to_owned(),
            _ => format!("socrata-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_write_timeout(mut self, timeout_secs: u64) -> Self {
        self.write_timeout = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

fn non_zero_or(value: u64, default: u64) -> u64 {
    if value == 0 { default } else { value }
}
