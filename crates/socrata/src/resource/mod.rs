//! Fluent query builder bound to one dataset endpoint.
//!
//! A [`Resource`] accumulates SoQL clauses through chained calls, turns
//! them into [`QueryParams`] and runs them against its [`Connection`]:
//!
//! - [`Resource::get`] fetches one page;
//! - [`Resource::iterate_chunks`], [`Resource::iterate_rows`] and
//!   [`Resource::all`] walk the whole result set page by page;
//! - [`Resource::upsert`], [`Resource::replace`] and [`Resource::delete`]
//!   write in batches.
//!
//! A resource is a single-owner value. Clone it to run the same query from
//! several tasks.

mod iterate;
mod mutate;
mod query;

pub use self::iterate::{BAILOUT, Chunk, ChunkControl, FETCH_ALL};
pub use self::query::SortDirection;
use self::query::QueryState;
use crate::connection::Connection;
use crate::params::QueryParams;
use crate::record::{Record, decode_records};
use crate::{Error, Result};

/// Tracing target for resource operations.
pub const TRACING_TARGET: &str = "socrata::resource";

/// Query builder and accessor for one dataset endpoint.
#[derive(Debug, Clone)]
pub struct Resource {
    connection: Connection,
    path: String,
    read_only: bool,
    query: QueryState,
    chunk_size: usize,
}

impl Resource {
    /// Creates a resource for `path`, e.g. `/resource/abcd-1234.json`.
    ///
    /// The chunk size starts at the connection's current maximum.
    pub fn new(connection: Connection, path: impl Into<String>) -> Self {
        let chunk_size = connection.max_chunk_size();

        Self {
            connection,
            path: path.into(),
            read_only: false,
            query: QueryState::default(),
            chunk_size,
        }
    }

    /// Returns the endpoint path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the connection this resource sends requests through.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Marks the resource read-only, refusing upsert, replace and delete.
    pub fn read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    /// Returns whether the resource refuses mutations.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Clears every clause, limit and offset.
    ///
    /// The path, read-only flag and chunk size are kept.
    pub fn reset_query(&mut self) -> &mut Self {
        self.query = QueryState::default();
        self
    }

    /// Replaces the select list, e.g. `["col1", "MAX(col2) as 'max'"]`.
    pub fn select<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.selects = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Appends one select expression.
    pub fn add_select(&mut self, field: impl Into<String>) -> &mut Self {
        self.query.selects.push(field.into());
        self
    }

    /// Appends a raw where clause; all clauses are ANDed together.
    ///
    /// ```rust,ignore
    /// resource
    ///     .where_raw("name = 'foobar'")
    ///     .where_raw("(x > '2' OR y < '3')")
    ///     .where_raw("(foo IS NOT NULL)");
    /// ```
    pub fn where_raw(&mut self, clause: impl Into<String>) -> &mut Self {
        self.query.wheres.push(clause.into());
        self
    }

    /// Appends `field`, `operator` and the quoted `value` as a where clause.
    ///
    /// The value is wrapped in single quotes but not escaped. Callers must
    /// escape quotes in untrusted input themselves.
    pub fn where_op(&mut self, field: &str, operator: &str, value: &str) -> &mut Self {
        self.where_raw(format!("{field}{operator}'{value}'"))
    }

    /// Appends an equality clause.
    pub fn where_equals(&mut self, field: &str, value: &str) -> &mut Self {
        self.where_op(field, "=", value)
    }

    /// Appends an order clause.
    pub fn order_by(&mut self, field: &str, direction: SortDirection) -> &mut Self {
        self.query.orders.push(format!("{field} {direction}"));
        self
    }

    /// Appends a group clause.
    pub fn group_by(&mut self, field: impl Into<String>) -> &mut Self {
        self.query.groups.push(field.into());
        self
    }

    /// Sets the full text search term.
    ///
    /// # Errors
    ///
    /// Only one search may be set per query; a second call fails with
    /// [`ErrorKind::InvalidQuery`](crate::ErrorKind::InvalidQuery).
    pub fn text_search(&mut self, query: impl Into<String>) -> Result<&mut Self> {
        if self.query.text_search.is_some() {
            return Err(Error::invalid_query()
                .with_message("Only one text search can be defined per query"));
        }

        self.query.text_search = Some(query.into());
        Ok(self)
    }

    /// Sets the row limit.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidQuery`](crate::ErrorKind::InvalidQuery)
    /// when `limit` exceeds the connection's current maximum chunk size.
    pub fn limit(&mut self, limit: usize) -> Result<&mut Self> {
        let max = self.connection.max_chunk_size();
        if limit > max {
            return Err(Error::invalid_query()
                .with_message(format!("Limit exceeds connection maximum chunk size of {max}")));
        }

        self.query.limit = Some(limit);
        Ok(self)
    }

    /// Sets the row offset.
    pub fn offset(&mut self, offset: usize) -> &mut Self {
        self.query.offset = Some(offset);
        self
    }

    /// Returns the page size used by iteration and batch writes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sets the page size used by iteration and batch writes.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidQuery`](crate::ErrorKind::InvalidQuery)
    /// when `size` is zero or exceeds the connection's maximum chunk size.
    pub fn set_chunk_size(&mut self, size: usize) -> Result<&mut Self> {
        let max = self.connection.max_chunk_size();
        if size > max {
            return Err(Error::invalid_query()
                .with_message(format!("Chunk size cannot exceed {max}")));
        }
        if size == 0 {
            return Err(Error::invalid_query().with_message("Chunk size must be positive"));
        }

        self.chunk_size = size;
        Ok(self)
    }

    /// Builds the query parameters for the current state.
    pub fn to_params(&self) -> QueryParams {
        self.query.to_params()
    }

    /// Fetches one page of rows matching the current query.
    pub async fn get(&self) -> Result<Vec<Record>> {
        let params = self.to_params();
        let body = self.connection.get(&self.path, &params).await?;
        decode_records(body)
    }
}
