//! The HTTP seam between the query layer and the wire.

use std::sync::Arc;

use serde_json::Value;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::Result;
use crate::params::QueryParams;

/// HTTP verbs used against the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// Read rows or metadata.
    Get,
    /// Upsert rows.
    Post,
    /// Replace the dataset's rows.
    Put,
    /// Delete at the HTTP level.
    Delete,
}

impl Method {
    /// Returns whether the verb changes remote state.
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// A single request against a path relative to the connection's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP verb.
    pub method: Method,
    /// Path below the base URL, e.g. `/resource/abcd-1234.json`.
    pub path: String,
    /// Query string parameters.
    pub params: QueryParams,
    /// JSON body for POST and PUT.
    pub body: Option<Value>,
}

impl TransportRequest {
    /// Creates a request without parameters or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
        }
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Core trait for executing requests against the platform.
///
/// Implementations attach authentication, encode the body and decode the
/// response into a generic JSON document. Failures are reported as
/// [`ErrorKind::TransportFailure`](crate::ErrorKind::TransportFailure) and
/// are never retried.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Executes one request and returns the decoded response body.
    async fn send(&self, request: TransportRequest) -> Result<Value>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TransportRequest) -> Result<Value> {
        (**self).send(request).await
    }
}
