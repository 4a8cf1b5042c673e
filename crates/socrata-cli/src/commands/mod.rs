//! Command execution.
//!
//! Every command returns the JSON document printed on stdout.

mod metadata;
mod query;
mod write;

use serde_json::Value;
use socrata::{Connection, Resource};

use crate::config::Command;

/// Runs `command` against `connection`.
pub async fn execute(connection: &Connection, command: Command) -> anyhow::Result<Value> {
    match command {
        Command::Query(args) => query::run(connection, args).await,
        Command::Upsert(args) => write::upsert(connection, args).await,
        Command::Replace(args) => write::replace(connection, args).await,
        Command::Delete(args) => write::delete(connection, args).await,
        Command::Metadata(command) => metadata::run(connection, command).await,
    }
}

/// Creates a resource for `dataset`, applying an optional chunk size.
fn resource(
    connection: &Connection,
    dataset: &str,
    chunk_size: Option<usize>,
) -> anyhow::Result<Resource> {
    let mut resource = connection.resource(dataset);
    if let Some(size) = chunk_size {
        resource.set_chunk_size(size)?;
    }
    Ok(resource)
}
