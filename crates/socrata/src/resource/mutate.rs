//! Batched writes against a resource.

use serde_json::Value;

use super::iterate::ChunkScan;
use super::{Resource, TRACING_TARGET};
use crate::record::{INTERNAL_ID, Record, mark_deleted};
use crate::transport::Method;
use crate::{Error, Result};

impl Resource {
    /// Creates or updates rows, one POST per [`chunk_size`](Self::chunk_size)
    /// batch.
    ///
    /// After each batch `on_batch` receives the number of rows sent so far
    /// and the server's response. Batches already written stay written if
    /// a later one fails; the failing batch's error is returned.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ReadOnlyViolation`](crate::ErrorKind::ReadOnlyViolation)
    /// without sending anything when the resource is read-only.
    pub async fn upsert<F>(&self, items: &[Record], on_batch: F) -> Result<()>
    where
        F: FnMut(usize, Value),
    {
        self.write_batches(Method::Post, items, on_batch).await
    }

    /// Replaces rows, one PUT per [`chunk_size`](Self::chunk_size) batch.
    ///
    /// Same contract as [`upsert`](Self::upsert).
    pub async fn replace<F>(&self, items: &[Record], on_batch: F) -> Result<()>
    where
        F: FnMut(usize, Value),
    {
        self.write_batches(Method::Put, items, on_batch).await
    }

    /// Deletes every row matching the current query.
    ///
    /// Matching rows are read a chunk at a time with only their internal
    /// id selected, flagged with `:deleted` and upserted back. Each chunk
    /// goes through [`upsert`](Self::upsert) with `on_batch` as its
    /// handler, so the count it receives restarts at every chunk. The
    /// select list, limit and offset are restored before returning, on
    /// success and on failure.
    ///
    /// Pages are requested at increasing offsets while earlier pages are
    /// being removed, so a server that compacts deleted rows right away
    /// can leave some matches behind. Repeat the call until it sends
    /// nothing if every match must go.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::ReadOnlyViolation`](crate::ErrorKind::ReadOnlyViolation)
    /// without sending anything when the resource is read-only.
    pub async fn delete<F>(&mut self, mut on_batch: F) -> Result<()>
    where
        F: FnMut(usize, Value),
    {
        self.ensure_writable("delete")?;

        let saved_selects =
            std::mem::replace(&mut self.query.selects, vec![INTERNAL_ID.to_owned()]);
        let saved_window = self.query.window();

        let result = self.delete_chunks(&mut on_batch).await;

        self.query.selects = saved_selects;
        self.query.restore_window(saved_window);
        result
    }

    async fn delete_chunks<F>(&mut self, on_batch: &mut F) -> Result<()>
    where
        F: FnMut(usize, Value),
    {
        let mut scan = ChunkScan::default();
        let mut deleted = 0;

        while let Some(mut chunk) = self.next_chunk(&mut scan).await? {
            mark_deleted(&mut chunk.records);

            self.upsert(&chunk.records, &mut *on_batch).await?;
            deleted += chunk.len();
        }

        tracing::info!(
            target: TRACING_TARGET,
            path = %self.path,
            deleted,
            "Deleted rows"
        );

        Ok(())
    }

    async fn write_batches<F>(&self, method: Method, items: &[Record], mut on_batch: F) -> Result<()>
    where
        F: FnMut(usize, Value),
    {
        self.ensure_writable(method.as_ref())?;

        let mut sent = 0;
        for batch in items.chunks(self.chunk_size) {
            let payload = serde_json::to_value(batch)?;
            let response = match method {
                Method::Put => self.connection.put(&self.path, payload).await?,
                _ => self.connection.post(&self.path, payload).await?,
            };
            sent += batch.len();

            tracing::debug!(
                target: TRACING_TARGET,
                path = %self.path,
                method = %method,
                batch = batch.len(),
                sent,
                "Wrote batch"
            );

            on_batch(sent, response);
        }

        Ok(())
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            return Err(Error::read_only()
                .with_message(format!("Cannot {operation} on read-only resource {}", self.path)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::connection::{Connection, ConnectionConfig};
    use crate::mock::MockTransport;
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

    #[tokio::test]
    async fn test_upsert_posts_batches() {
        let mock = MockTransport::new();
        let resource = resource(&mock, 2);

        let mut progress = Vec::new();
        resource
            .upsert(&rows(5), |sent, response| {
                progress.push((sent, response["Rows Processed"].as_u64().unwrap()));
            })
            .await
            .unwrap();

        assert_eq!(progress, vec![(2, 2), (4, 2), (5, 1)]);
        let posts = mock.requests_with(Method::Post);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].path, PATH);
        assert_eq!(posts[2].body, Some(json!([{":id": "row-4", "n": 4}])));
    }

    #[tokio::test]
    async fn test_upsert_nothing_sends_nothing() {
        let mock = MockTransport::new();
        let resource = resource(&mock, 2);

        resource.upsert(&[], |_, _| {}).await.unwrap();
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_replace_puts_batches() {
        let mock = MockTransport::new();
        let resource = resource(&mock, 3);

        resource.replace(&rows(4), |_, _| {}).await.unwrap();

        assert_eq!(mock.count(Method::Put), 2);
        assert_eq!(mock.count(Method::Post), 0);
    }

    #[tokio::test]
    async fn test_upsert_stops_at_failing_batch() {
        let mock = MockTransport::new().fail_nth(Method::Post, 2);
        let resource = resource(&mock, 2);

        let mut progress = Vec::new();
        let error = resource
            .upsert(&rows(6), |sent, _| progress.push(sent))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::TransportFailure);
        assert_eq!(progress, vec![2]);
        assert_eq!(mock.count(Method::Post), 2);
    }

    #[tokio::test]
    async fn test_read_only_resource_sends_nothing() {
        let mock = MockTransport::new().with_rows(PATH, rows(3));
        let mut resource = resource(&mock, 2);
        resource.read_only(true);

        let error = resource.upsert(&rows(3), |_, _| {}).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ReadOnlyViolation);

        let error = resource.replace(&rows(3), |_, _| {}).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ReadOnlyViolation);

        let error = resource.delete(|_, _| {}).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ReadOnlyViolation);

        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_read_only_connection_rejects_upsert() {
        let mock = MockTransport::new();
        let resource = resource(&mock, 2);
        resource.connection().set_read_only(true);

        let error = resource.upsert(&rows(1), |_, _| {}).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ReadOnlyViolation);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_marks_ids_and_restores_selects() {
        let mock = MockTransport::new().with_rows(PATH, rows(3));
        let mut resource = resource(&mock, 2);
        resource.select(["n", "name"]).where_raw("n < 10").limit(1).unwrap();
        let before = resource.to_params();

        let mut progress = Vec::new();
        resource
            .delete(|sent, _| progress.push(sent))
            .await
            .unwrap();

        assert_eq!(progress, vec![2, 1]);
        assert_eq!(resource.to_params(), before);

        let gets = mock.requests_with(Method::Get);
        assert!(gets.iter().all(|r| r.params.get("$select") == Some(":id")));
        assert!(gets.iter().all(|r| r.params.get("$where") == Some("n < 10")));

        let posts = mock.requests_with(Method::Post);
        assert_eq!(posts.len(), 2);
        assert_eq!(
            posts[0].body,
            Some(json!([
                {":id": "row-0", ":deleted": true},
                {":id": "row-1", ":deleted": true},
            ]))
        );
        assert_eq!(
            posts[1].body,
            Some(json!([{":id": "row-2", ":deleted": true}]))
        );
    }

    #[tokio::test]
    async fn test_delete_restores_selects_after_failure() {
        let mock = MockTransport::new()
            .with_rows(PATH, rows(4))
            .fail_nth(Method::Post, 1);
        let mut resource = resource(&mock, 2);
        resource.select(["n"]).offset(3);
        let before = resource.to_params();

        let error = resource.delete(|_, _| {}).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::TransportFailure);
        assert_eq!(resource.to_params(), before);
    }

    #[tokio::test]
    async fn test_delete_counts_restart_per_chunk() {
        let mock = MockTransport::new().with_rows(PATH, rows(5));
        let mut resource = resource(&mock, 2);

        let mut progress = Vec::new();
        resource
            .delete(|sent, response| {
                progress.push((sent, response["Rows Processed"].as_u64().unwrap()));
            })
            .await
            .unwrap();

        assert_eq!(progress, vec![(2, 2), (2, 2), (1, 1)]);
    }

    #[tokio::test]
    async fn test_delete_with_no_matches() {
        let mock = MockTransport::new().with_rows(PATH, Vec::new());
        let mut resource = resource(&mock, 2);

        let mut calls = 0;
        resource.delete(|_, _| calls += 1).await.unwrap();

        assert_eq!(calls, 0);
        assert_eq!(mock.count(Method::Post), 0);
    }
}
