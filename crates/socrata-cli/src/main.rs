#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod telemetry;

use std::io::Write;
use std::process;

use anyhow::Context;
use serde_json::Value;
use socrata::Connection;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_CONFIG: &str = "socrata_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "socrata_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = %format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing()?;
    cli.log();
    cli.validate()?;

    let connection = Connection::connect(cli.connection.clone(), cli.http.clone())
        .context("failed to create connection")?;

    let output = commands::execute(&connection, cli.command).await?;
    print_json(&output)
}

/// Writes `value` to stdout as pretty-printed JSON.
fn print_json(value: &Value) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("failed to encode output")?;
    writeln!(stdout).context("failed to write output")?;
    Ok(())
}
