//! The `metadata` commands.

use serde_json::Value;
use socrata::{Connection, Metadata};

use crate::TRACING_TARGET_COMMAND;
use crate::config::MetadataCommand;

/// Runs a metadata subcommand.
pub async fn run(connection: &Connection, command: MetadataCommand) -> anyhow::Result<Value> {
    let catalog = connection.metadata();

    match command {
        MetadataCommand::List => Ok(to_json(catalog.list().await?)),
        MetadataCommand::Get { id } => Ok(Value::Object(catalog.resource(&id).await?.into_raw())),
        MetadataCommand::Search { term } => {
            let matches = catalog.search(&term, None).await?;
            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                term = %term,
                matches = matches.len(),
                "Metadata search complete"
            );
            Ok(to_json(matches))
        }
    }
}

fn to_json(metadata: Vec<Metadata>) -> Value {
    metadata
        .into_iter()
        .map(|meta| Value::Object(meta.into_raw()))
        .collect()
}
