//! Reqwest-based HTTP transport.
//!
//! This module provides the [`Transport`](crate::Transport) used by
//! [`Connection::connect`](crate::Connection::connect).
//!
//! # Example
//!
//! ```rust,ignore
//! use socrata::reqwest::{ReqwestClient, ReqwestConfig};
//! use socrata::{Connection, ConnectionConfig};
//!
//! let config = ConnectionConfig::new("https://data.example.gov");
//! let client = ReqwestClient::new(&config, ReqwestConfig::default().with_timeout(10))?;
//! let connection = Connection::new(&config, client)?;
//! ```

mod client;
mod config;
mod error;

pub use self::client::ReqwestClient;
pub use self::config::{DEFAULT_READ_TIMEOUT_SECS, DEFAULT_WRITE_TIMEOUT_SECS, ReqwestConfig};
pub use self::error::Error;

/// Tracing target for reqwest transport operations.
pub const TRACING_TARGET: &str = "socrata::reqwest";
