//! Subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use socrata::SortDirection;

/// Operation to run against the portal.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Query rows of a dataset
    Query(QueryArgs),
    /// Create or update rows from a JSON file
    Upsert(WriteArgs),
    /// Replace rows from a JSON file
    Replace(WriteArgs),
    /// Delete the rows matching a filter
    Delete(DeleteArgs),
    /// Inspect dataset metadata
    #[command(subcommand)]
    Metadata(MetadataCommand),
}

/// Arguments of the `query` command.
#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// Dataset id, e.g. `abcd-1234`
    pub dataset: String,

    /// Column or expression to select (repeatable)
    #[arg(long = "select", value_name = "FIELD")]
    pub selects: Vec<String>,

    /// Raw where clause, ANDed with the others (repeatable)
    #[arg(long = "where", value_name = "CLAUSE")]
    pub wheres: Vec<String>,

    /// Sort column with optional `:asc` or `:desc` suffix (repeatable)
    #[arg(long = "order", value_name = "FIELD[:DIR]", value_parser = parse_order)]
    pub orders: Vec<OrderSpec>,

    /// Column to group by (repeatable)
    #[arg(long = "group", value_name = "FIELD")]
    pub groups: Vec<String>,

    /// Full text search term
    #[arg(long = "search", value_name = "QUERY")]
    pub search: Option<String>,

    /// Maximum number of rows for a single page
    #[arg(long = "limit", conflicts_with = "all")]
    pub limit: Option<usize>,

    /// Number of rows to skip for a single page
    #[arg(long = "offset", conflicts_with = "all")]
    pub offset: Option<usize>,

    /// Fetch the whole result set page by page
    #[arg(long = "all")]
    pub all: bool,

    /// Stop collecting after this many rows (0 reads everything)
    #[arg(long = "bailout", requires = "all")]
    pub bailout: Option<usize>,

    /// Rows requested per page when fetching with `--all`
    #[arg(long = "chunk-size")]
    pub chunk_size: Option<usize>,
}

/// Arguments of the `upsert` and `replace` commands.
#[derive(Debug, Clone, Args)]
pub struct WriteArgs {
    /// Dataset id, e.g. `abcd-1234`
    pub dataset: String,

    /// JSON file holding an array of row objects
    pub file: PathBuf,

    /// Rows sent per request
    #[arg(long = "chunk-size")]
    pub chunk_size: Option<usize>,
}

/// Arguments of the `delete` command.
#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// Dataset id, e.g. `abcd-1234`
    pub dataset: String,

    /// Raw where clause selecting the rows to delete (repeatable)
    #[arg(long = "where", value_name = "CLAUSE")]
    pub wheres: Vec<String>,

    /// Rows read and deleted per request
    #[arg(long = "chunk-size")]
    pub chunk_size: Option<usize>,
}

/// Metadata subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum MetadataCommand {
    /// List the metadata of every dataset
    List,
    /// Show the metadata of one dataset
    Get {
        /// Dataset id, e.g. `abcd-1234`
        id: String,
    },
    /// Find datasets whose metadata mentions a term
    Search {
        /// Case-insensitive search term
        term: String,
    },
}

/// A parsed `--order` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Parses `field`, `field:asc` or `field:desc`.
///
/// System fields such as `:id` keep their leading colon.
fn parse_order(value: &str) -> Result<OrderSpec, String> {
    let (field, direction) = match value.rsplit_once(':') {
        Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => (field, SortDirection::Asc),
        Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => (field, SortDirection::Desc),
        _ => (value, SortDirection::Asc),
    };

    if field.is_empty() {
        return Err(format!("missing field name in '{value}'"));
    }

    Ok(OrderSpec {
        field: field.to_owned(),
        direction,
    })
}
