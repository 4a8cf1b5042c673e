//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── connection: ConnectionConfig # Portal URL, app token, credentials, limits
//! ├── http: ReqwestConfig          # Timeout, user agent
//! └── command: Command             # query | upsert | replace | delete | metadata
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Query a dataset
//! socrata-cli --base-url https://data.example.gov query abcd-1234 --where "status='open'"
//!
//! # Or via environment variables
//! SOCRATA_BASE_URL=https://data.example.gov socrata-cli metadata search parking
//! ```

mod command;

use std::process;

use anyhow::Context;
use clap::Parser;
use socrata::{ConnectionConfig, ReqwestConfig};

pub use self::command::{
    Command, DeleteArgs, MetadataCommand, OrderSpec, QueryArgs, WriteArgs,
};
use crate::TRACING_TARGET_CONFIG;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "socrata-cli")]
#[command(about = "Query and update datasets on a Socrata open-data portal")]
#[command(version)]
pub struct Cli {
    /// Portal connection configuration.
    #[clap(flatten)]
    pub connection: ConnectionConfig,

    /// HTTP client configuration.
    #[clap(flatten)]
    pub http: ReqwestConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.connection
            .validate()
            .context("invalid connection configuration")?;
        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            base_url = %self.connection.base_url,
            max_chunk_size = self.connection.max_chunk_size,
            read_only = self.connection.read_only,
            app_token = self.connection.effective_app_token().is_some(),
            basic_auth = self.connection.credentials().is_some(),
            http_timeout_secs = self.http.effective_timeout().as_secs(),
            write_timeout_secs = self.http.effective_write_timeout().as_secs(),
            "Connection configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
