//! In-memory transport for testing.
//!
//! [`MockTransport`] serves stored rows and documents without a network,
//! paging rows by `$limit` / `$offset` the way the platform does and
//! recording every request it receives.
//!
//! # Feature Flag
//!
//! Outside this crate's own tests the module is only available when the
//! `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! socrata = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use socrata::mock::MockTransport;
//!
//! let mock = MockTransport::new().with_rows("/resource/abcd-1234.json", rows);
//! let connection = Connection::new(&config, mock.clone())?;
//! let all = connection.resource("abcd-1234").all(FETCH_ALL).await?;
//! assert_eq!(mock.count(Method::Get), 2);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::params::{LIMIT, OFFSET, SELECT};
use crate::record::Record;
use crate::transport::{Method, Transport, TransportRequest};
use crate::{Error, Result};

/// Page size the platform applies when no `$limit` is sent.
const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Default)]
struct MockState {
    rows: HashMap<String, Vec<Record>>,
    documents: HashMap<String, Value>,
    failures: HashMap<Method, usize>,
    requests: Vec<TransportRequest>,
}

/// Transport that answers from memory.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Creates a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `rows` from `path`, paged by `$limit` and `$offset`.
    #[must_use]
    pub fn with_rows(self, path: impl Into<String>, rows: Vec<Record>) -> Self {
        self.lock().rows.insert(path.into(), rows);
        self
    }

    /// Serves `document` verbatim for GET requests to `path`.
    #[must_use]
    pub fn with_document(self, path: impl Into<String>, document: Value) -> Self {
        self.lock().documents.insert(path.into(), document);
        self
    }

    /// Makes the `nth` (1-based) request with `method` fail.
    #[must_use]
    pub fn fail_nth(self, method: Method, nth: usize) -> Self {
        self.lock().failures.insert(method, nth);
        self
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.lock().requests.clone()
    }

    /// Returns the requests received with `method`, in order.
    pub fn requests_with(&self, method: Method) -> Vec<TransportRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }

    /// Number of requests received with `method`.
    pub fn count(&self, method: Method) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method)
            .count()
    }

    fn respond(&self, request: TransportRequest) -> Result<Value> {
        let mut state = self.lock();
        state.requests.push(request.clone());

        let seen = state
            .requests
            .iter()
            .filter(|r| r.method == request.method)
            .count();
        if state.failures.get(&request.method) == Some(&seen) {
            return Err(Error::transport().with_message(format!(
                "HTTP 500 on {} #{seen}",
                request.method
            )));
        }

        match request.method {
            Method::Get => state.serve_get(&request),
            Method::Post | Method::Put => {
                let rows = request
                    .body
                    .as_ref()
                    .and_then(Value::as_array)
                    .map_or(0, Vec::len);
                Ok(json!({ "Rows Processed": rows, "Errors": 0 }))
            }
            Method::Delete => Ok(Value::Null),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MockState {
    fn serve_get(&self, request: &TransportRequest) -> Result<Value> {
        if let Some(document) = self.documents.get(&request.path) {
            return Ok(document.clone());
        }

        let Some(rows) = self.rows.get(&request.path) else {
            return Err(Error::transport().with_message(format!("HTTP 404 for {}", request.path)));
        };

        let offset = request.params.get_usize(OFFSET).unwrap_or(0);
        let limit = request.params.get_usize(LIMIT).unwrap_or(DEFAULT_PAGE_SIZE);
        let fields: Option<Vec<&str>> = request
            .params
            .get(SELECT)
            .map(|s| s.split(',').map(str::trim).collect());

        let page: Vec<Value> = rows
            .iter()
            .skip(offset)
            .take(limit)
            .map(|row| match &fields {
                Some(fields) => project(row, fields),
                None => row.clone(),
            })
            .map(Value::Object)
            .collect();

        Ok(Value::Array(page))
    }
}

fn project(row: &Record, fields: &[&str]) -> Record {
    row.iter()
        .filter(|(key, _)| fields.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value> {
        self.respond(request)
    }
}
