//! The `query` command.

use serde_json::Value;
use socrata::{BAILOUT, Connection};

use crate::TRACING_TARGET_COMMAND;
use crate::config::QueryArgs;

/// Runs a query and returns the matching rows.
pub async fn run(connection: &Connection, args: QueryArgs) -> anyhow::Result<Value> {
    let mut resource = super::resource(connection, &args.dataset, args.chunk_size)?;

    resource.select(args.selects);
    for clause in args.wheres {
        resource.where_raw(clause);
    }
    for order in &args.orders {
        resource.order_by(&order.field, order.direction);
    }
    for group in args.groups {
        resource.group_by(group);
    }
    if let Some(search) = args.search {
        resource.text_search(search)?;
    }
    if let Some(limit) = args.limit {
        resource.limit(limit)?;
    }
    if let Some(offset) = args.offset {
        resource.offset(offset);
    }

    let records = if args.all {
        resource.all(args.bailout.unwrap_or(BAILOUT)).await?
    } else {
        resource.get().await?
    };

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        dataset = %args.dataset,
        records = records.len(),
        "Query complete"
    );

    Ok(serde_json::to_value(records)?)
}
