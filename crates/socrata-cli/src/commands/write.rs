//! The `upsert`, `replace` and `delete` commands.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde_json::{Value, json};
use socrata::{Connection, Record};

use crate::TRACING_TARGET_COMMAND;
use crate::config::{DeleteArgs, WriteArgs};

/// Upserts the rows in `args.file`.
pub async fn upsert(connection: &Connection, args: WriteArgs) -> anyhow::Result<Value> {
    let records = read_records(&args.file)?;
    let resource = super::resource(connection, &args.dataset, args.chunk_size)?;

    let mut report = BatchReport::default();
    let result = resource
        .upsert(&records, |sent, response| report.record(sent, response))
        .await;
    result.with_context(|| {
        format!("upsert into {} failed after {} rows", args.dataset, report.sent)
    })?;

    report.log("upsert", &args.dataset);
    Ok(report.into_json())
}

/// Replaces rows with those in `args.file`.
pub async fn replace(connection: &Connection, args: WriteArgs) -> anyhow::Result<Value> {
    let records = read_records(&args.file)?;
    let resource = super::resource(connection, &args.dataset, args.chunk_size)?;

    let mut report = BatchReport::default();
    let result = resource
        .replace(&records, |sent, response| report.record(sent, response))
        .await;
    result.with_context(|| {
        format!("replace of {} failed after {} rows", args.dataset, report.sent)
    })?;

    report.log("replace", &args.dataset);
    Ok(report.into_json())
}

/// Deletes the rows matching `args.wheres`.
pub async fn delete(connection: &Connection, args: DeleteArgs) -> anyhow::Result<Value> {
    let mut resource = super::resource(connection, &args.dataset, args.chunk_size)?;
    for clause in args.wheres {
        resource.where_raw(clause);
    }

    let mut report = BatchReport::default();
    let result = resource
        .delete(|sent, response| report.add(sent, response))
        .await;
    result.with_context(|| {
        format!("delete from {} failed after {} rows", args.dataset, report.sent)
    })?;

    report.log("delete", &args.dataset);
    Ok(report.into_json())
}

/// Reads a JSON array of row objects.
fn read_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of objects", path.display()))
}

/// Progress collected from batch callbacks.
#[derive(Debug, Default)]
struct BatchReport {
    sent: usize,
    responses: Vec<Value>,
}

impl BatchReport {
    fn record(&mut self, sent: usize, response: Value) {
        self.sent = sent;
        self.responses.push(response);
    }

    /// Delete reports rows per chunk, so the total is summed here.
    fn add(&mut self, sent: usize, response: Value) {
        self.sent += sent;
        self.responses.push(response);
    }

    fn log(&self, operation: &str, dataset: &str) {
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            operation,
            dataset,
            sent = self.sent,
            batches = self.responses.len(),
            "Write complete"
        );
    }

    fn into_json(self) -> Value {
        json!({
            "sent": self.sent,
            "responses": self.responses,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use socrata::Method;
    use socrata::mock::MockTransport;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::commands::tests::{PATH, connection, rows};

    fn rows_file(records: &[Record]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, records).unwrap();
        file.flush().unwrap();
        file
    }

    fn write_args(file: &NamedTempFile) -> WriteArgs {
        WriteArgs {
            dataset: "abcd-1234".into(),
            file: file.path().to_path_buf(),
            chunk_size: Some(2),
        }
    }

    #[tokio::test]
    async fn test_upsert_from_file() {
        let mock = MockTransport::new();
        let file = rows_file(&rows(3));

        let output = upsert(&connection(&mock), write_args(&file)).await.unwrap();

        assert_eq!(output["sent"], json!(3));
        assert_eq!(output["responses"].as_array().unwrap().len(), 2);
        assert_eq!(mock.count(Method::Post), 2);
    }

    #[tokio::test]
    async fn test_replace_from_file() {
        let mock = MockTransport::new();
        let file = rows_file(&rows(1));

        let output = replace(&connection(&mock), write_args(&file)).await.unwrap();

        assert_eq!(output["sent"], json!(1));
        assert_eq!(mock.count(Method::Put), 1);
    }

    #[tokio::test]
    async fn test_invalid_file_sends_nothing() {
        let mock = MockTransport::new();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"an array\"}}").unwrap();

        let error = upsert(&connection(&mock), write_args(&file)).await.unwrap_err();

        assert!(error.to_string().contains("not a JSON array"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_matching_rows() {
        let mock = MockTransport::new().with_rows(PATH, rows(5));
        let args = DeleteArgs {
            dataset: "abcd-1234".into(),
            wheres: vec!["n < 10".into()],
            chunk_size: Some(2),
        };

        let output = delete(&connection(&mock), args).await.unwrap();

        assert_eq!(output["sent"], json!(5));
        assert_eq!(output["responses"].as_array().unwrap().len(), 3);
        let posts = mock.requests_with(Method::Post);
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[2].body, Some(json!([{":id": "row-4", ":deleted": true}])));
    }

    #[tokio::test]
    async fn test_read_only_connection_refuses_writes() {
        let mock = MockTransport::new();
        let connection = connection(&mock);
        connection.set_read_only(true);
        let file = rows_file(&rows(1));

        assert!(upsert(&connection, write_args(&file)).await.is_err());
        assert!(mock.requests().is_empty());
    }
}
