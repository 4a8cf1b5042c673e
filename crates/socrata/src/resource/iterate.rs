//! Chunked pagination over a resource's result set.

use super::{Resource, TRACING_TARGET};
use crate::Result;
use crate::record::Record;

/// Default row cap for [`Resource::all`].
pub const BAILOUT: usize = 100_000;

/// Bailout value that disables the row cap in [`Resource::all`].
pub const FETCH_ALL: usize = 0;

/// Returned by chunk handlers to continue or end iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChunkControl {
    /// Fetch the next chunk.
    #[default]
    Continue,
    /// End iteration after this chunk.
    Stop,
}

/// One page of rows handed to a chunk handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Rows in the page, in server order.
    pub records: Vec<Record>,
    /// Offset the page was requested at.
    pub offset: usize,
    /// Limit the page was requested with.
    pub limit: usize,
}

impl Chunk {
    /// Number of rows in the chunk.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the chunk holds no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Cursor over successive pages.
#[derive(Debug, Default)]
pub(super) struct ChunkScan {
    offset: usize,
    exhausted: bool,
}

impl Resource {
    /// Fetches the page under `scan` and advances it.
    ///
    /// Overwrites the query's limit and offset; callers restore them.
    /// Returns `None` once an empty page comes back.
    pub(super) async fn next_chunk(&mut self, scan: &mut ChunkScan) -> Result<Option<Chunk>> {
        if scan.exhausted {
            return Ok(None);
        }

        let limit = self.chunk_size;
        self.query.limit = Some(limit);
        self.query.offset = Some(scan.offset);

        let records = self.get().await?;
        tracing::debug!(
            target: TRACING_TARGET,
            path = %self.path,
            offset = scan.offset,
            limit,
            records = records.len(),
            "Fetched chunk"
        );

        if records.is_empty() {
            scan.exhausted = true;
            return Ok(None);
        }

        let chunk = Chunk {
            records,
            offset: scan.offset,
            limit,
        };
        scan.offset += limit;
        Ok(Some(chunk))
    }

    /// Walks the result set one chunk at a time.
    ///
    /// Pages of [`chunk_size`](Self::chunk_size) rows are fetched with
    /// increasing offsets, one request at a time, until an empty page comes
    /// back or `handler` returns [`ChunkControl::Stop`]. If the first page
    /// is empty the handler is never called.
    ///
    /// The query's own limit and offset are restored before returning,
    /// whether iteration succeeds or a fetch fails.
    pub async fn iterate_chunks<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(Chunk) -> ChunkControl,
    {
        let saved = self.query.window();
        let result = self.scan_chunks(&mut handler).await;
        self.query.restore_window(saved);
        result
    }

    async fn scan_chunks<F>(&mut self, handler: &mut F) -> Result<()>
    where
        F: FnMut(Chunk) -> ChunkControl,
    {
        let mut scan = ChunkScan::default();
        while let Some(chunk) = self.next_chunk(&mut scan).await? {
            if handler(chunk) == ChunkControl::Stop {
                tracing::debug!(
                    target: TRACING_TARGET,
                    path = %self.path,
                    offset = scan.offset,
                    "Chunk iteration stopped by handler"
                );
                break;
            }
        }

        Ok(())
    }

    /// Calls `handler` for every row, in chunk order then row order.
    pub async fn iterate_rows<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(Record),
    {
        self.iterate_chunks(|chunk| {
            chunk.records.into_iter().for_each(&mut handler);
            ChunkControl::Continue
        })
        .await
    }

    /// Collects the whole result set.
    ///
    /// Before each chunk is kept, iteration stops if `bailout` rows have
    /// already been collected, so the cap is only checked between chunks.
    /// Pass [`FETCH_ALL`] to read until the data runs out.
    ///
    /// Chunks are returned newest first: the rows of the last fetched chunk
    /// come before those of the one fetched before it. Rows keep their
    /// order within a chunk. Add an `order_by` and sort afterwards if a
    /// global order matters.
    pub async fn all(&mut self, bailout: usize) -> Result<Vec<Record>> {
        let mut chunks: Vec<Vec<Record>> = Vec::new();
        let mut fetched = 0;

        self.iterate_chunks(|chunk| {
            if bailout != FETCH_ALL && fetched >= bailout {
                return ChunkControl::Stop;
            }

            fetched += chunk.len();
            chunks.push(chunk.records);
            ChunkControl::Continue
        })
        .await?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %self.path,
            records = fetched,
            chunks = chunks.len(),
            "Collected result set"
        );

        Ok(chunks.into_iter().rev().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connection::{Connection, ConnectionConfig};
    use crate::mock::MockTransport;
    use crate::transport::Method;
    use crate::ErrorKind;

    const PATH: &str = "/resource/abcd-1234.json";

    fn rows(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| json!({":id": format!("row-{i}"), "n": i}).as_object().cloned().unwrap())
            .collect()
    }

    fn resource(mock: &MockTransport, chunk_size: usize) -> Resource {
        let config = ConnectionConfig::new("https://data.example.gov");
        let mut resource = Connection::new(&config, mock.clone())
            .unwrap()
            .resource("abcd-1234");
        resource.set_chunk_size(chunk_size).unwrap();
        resource
    }

    fn numbers(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r["n"].as_u64().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_iterate_chunks_visits_every_page() {
        let mock = MockTransport::new().with_rows(PATH, rows(7));
        let mut resource = resource(&mock, 3);

        let mut seen = Vec::new();
        resource
            .iterate_chunks(|chunk| {
                seen.push((chunk.offset, chunk.limit, chunk.len()));
                ChunkControl::Continue
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(0, 3, 3), (3, 3, 3), (6, 3, 1)]);
        // three pages plus the empty one that ends iteration
        assert_eq!(mock.count(Method::Get), 4);
    }

    #[tokio::test]
    async fn test_iterate_chunks_restores_window() {
        let mock = MockTransport::new().with_rows(PATH, rows(5));
        let mut resource = resource(&mock, 2);
        resource.limit(4).unwrap().offset(1);
        let before = resource.to_params();

        resource
            .iterate_chunks(|_| ChunkControl::Continue)
            .await
            .unwrap();

        assert_eq!(resource.to_params(), before);
    }

    #[tokio::test]
    async fn test_iterate_chunks_restores_window_after_failure() {
        let mock = MockTransport::new()
            .with_rows(PATH, rows(10))
            .fail_nth(Method::Get, 2);
        let mut resource = resource(&mock, 3);
        resource.offset(7);

        let mut calls = 0;
        let error = resource
            .iterate_chunks(|_| {
                calls += 1;
                ChunkControl::Continue
            })
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::TransportFailure);
        assert_eq!(calls, 1);
        assert_eq!(resource.to_params().get("$offset"), Some("7"));
        assert!(resource.to_params().get("$limit").is_none());
    }

    #[tokio::test]
    async fn test_empty_first_chunk_skips_handler() {
        let mock = MockTransport::new().with_rows(PATH, Vec::new());
        let mut resource = resource(&mock, 3);

        let mut calls = 0;
        resource
            .iterate_chunks(|_| {
                calls += 1;
                ChunkControl::Continue
            })
            .await
            .unwrap();

        assert_eq!(calls, 0);
        assert_eq!(mock.count(Method::Get), 1);
    }

    #[tokio::test]
    async fn test_stop_ends_iteration() {
        let mock = MockTransport::new().with_rows(PATH, rows(9));
        let mut resource = resource(&mock, 3);

        let mut calls = 0;
        resource
            .iterate_chunks(|_| {
                calls += 1;
                if calls == 2 {
                    ChunkControl::Stop
                } else {
                    ChunkControl::Continue
                }
            })
            .await
            .unwrap();

        assert_eq!(calls, 2);
        assert_eq!(mock.count(Method::Get), 2);
    }

    #[tokio::test]
    async fn test_iterate_rows_in_order() {
        let mock = MockTransport::new().with_rows(PATH, rows(5));
        let mut resource = resource(&mock, 2);

        let mut seen = Vec::new();
        resource
            .iterate_rows(|row| seen.push(row["n"].as_u64().unwrap()))
            .await
            .unwrap();

        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_all_stops_at_bailout_between_chunks() {
        let mock = MockTransport::new().with_rows(PATH, rows(9));
        let mut resource = resource(&mock, 3);

        let records = resource.all(5).await.unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(numbers(&records), vec![3, 4, 5, 0, 1, 2]);
    }

    #[tokio::test]
    async fn test_all_fetch_all_reads_to_end() {
        let mock = MockTransport::new().with_rows(PATH, rows(6));
        let mut resource = resource(&mock, 3);

        let records = resource.all(FETCH_ALL).await.unwrap();

        assert_eq!(numbers(&records), vec![3, 4, 5, 0, 1, 2]);
        assert_eq!(mock.count(Method::Get), 3);
    }

    #[tokio::test]
    async fn test_all_keeps_query_params() {
        let mock = MockTransport::new().with_rows(PATH, rows(4));
        let mut resource = resource(&mock, 2);
        resource.where_equals("borough", "BATH").select(["n"]);

        resource.all(BAILOUT).await.unwrap();

        let requests = mock.requests();
        assert!(requests
            .iter()
            .all(|r| r.params.get("$where") == Some("borough='BATH'")));
        assert_eq!(requests[1].params.get("$offset"), Some("2"));
        assert_eq!(requests[1].params.get("$limit"), Some("2"));
        assert!(resource.to_params().get("$limit").is_none());
    }
}
