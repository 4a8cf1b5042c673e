//! Shared connection to one data portal.
//!
//! A [`Connection`] owns the transport and the settings every
//! [`Resource`] built from it consults at call time: the maximum page
//! size and the read-only switch. Both live behind an `Arc`, so changes
//! made through any clone are visible to all of them.

mod config;
mod credentials;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::Value;
use sha2::{Digest, Sha256};

pub use self::config::{ABSOLUTE_MAXIMUM_CHUNK_SIZE, ConnectionConfig};
pub use self::credentials::Credentials;
use crate::metadata::MetadataCatalog;
use crate::params::QueryParams;
use crate::record::INTERNAL_ID;
use crate::resource::Resource;
use crate::transport::{Method, Transport, TransportRequest};
use crate::{Error, Result};

/// Tracing target for connection operations.
pub const TRACING_TARGET: &str = "socrata::connection";

/// Path below which dataset metadata is served.
pub const METADATA_BASE_PATH: &str = "/views";

struct ConnectionInner {
    transport: Arc<dyn Transport>,
    base_url: String,
    max_chunk_size: AtomicUsize,
    read_only: AtomicBool,
}

/// Handle to a data portal.
///
/// Cloning is cheap and every clone shares the same settings.
///
/// # Examples
///
/// ```rust,ignore
/// use socrata::{Connection, ConnectionConfig, ReqwestConfig};
///
/// let config = ConnectionConfig::new("https://data.example.gov").with_app_token("token");
/// let connection = Connection::connect(config, ReqwestConfig::default())?;
///
/// let mut resource = connection.resource("abcd-1234");
/// let rows = resource.where_equals("borough", "BATH").limit(50)?.get().await?;
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.inner.base_url)
            .field("max_chunk_size", &self.max_chunk_size())
            .field("read_only", &self.is_read_only())
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Creates a connection that sends requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: &ConnectionConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;

        let inner = ConnectionInner {
            transport: Arc::new(transport),
            base_url: config.base_url.clone(),
            max_chunk_size: AtomicUsize::new(config.max_chunk_size),
            read_only: AtomicBool::new(config.read_only),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            base_url = %config.base_url,
            max_chunk_size = config.max_chunk_size,
            read_only = config.read_only,
            "Connection created"
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Creates a connection backed by the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate or the
    /// HTTP client cannot be built.
    #[cfg(feature = "reqwest")]
    #[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
    pub fn connect(config: ConnectionConfig, http: crate::reqwest::ReqwestConfig) -> Result<Self> {
        let client = crate::reqwest::ReqwestClient::new(&config, http)?;
        Self::new(&config, client)
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Returns the current maximum page size.
    pub fn max_chunk_size(&self) -> usize {
        self.inner.max_chunk_size.load(Ordering::Acquire)
    }

    /// Changes the maximum page size.
    ///
    /// Resources re-check this bound whenever a limit or chunk size is set;
    /// values already set are not re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ReadOnlyViolation`](crate::ErrorKind::ReadOnlyViolation)
    /// when `size` is above [`ABSOLUTE_MAXIMUM_CHUNK_SIZE`], and a
    /// configuration error when it is zero.
    pub fn set_max_chunk_size(&self, size: usize) -> Result<()> {
        if size > ABSOLUTE_MAXIMUM_CHUNK_SIZE {
            return Err(Error::read_only().with_message(format!(
                "Maximum chunk size cannot exceed {ABSOLUTE_MAXIMUM_CHUNK_SIZE}"
            )));
        }
        if size == 0 {
            return Err(Error::configuration().with_message("Maximum chunk size must be positive"));
        }

        self.inner.max_chunk_size.store(size, Ordering::Release);
        Ok(())
    }

    /// Returns whether mutating requests are refused.
    pub fn is_read_only(&self) -> bool {
        self.inner.read_only.load(Ordering::Acquire)
    }

    /// Turns the read-only switch on or off.
    pub fn set_read_only(&self, read_only: bool) -> &Self {
        self.inner.read_only.store(read_only, Ordering::Release);
        self
    }

    /// Name of the system field carrying each row's internal identifier.
    pub fn internal_id(&self) -> &'static str {
        INTERNAL_ID
    }

    /// Path below which metadata documents live.
    pub fn metadata_base_path(&self) -> &'static str {
        METADATA_BASE_PATH
    }

    /// Stable hex digest identifying this portal.
    pub fn connection_hash(&self) -> String {
        hex::encode(Sha256::digest(self.inner.base_url.as_bytes()))
    }

    /// Creates a query builder for the dataset with the given id.
    pub fn resource(&self, dataset_id: &str) -> Resource {
        Resource::new(self.clone(), format!("/resource/{dataset_id}.json"))
    }

    /// Creates a query builder for an arbitrary endpoint path.
    pub fn resource_at(&self, path: impl Into<String>) -> Resource {
        Resource::new(self.clone(), path)
    }

    /// Creates a metadata catalog for this portal.
    pub fn metadata(&self) -> MetadataCatalog {
        MetadataCatalog::new(self.clone())
    }

    /// Issues a GET request.
    pub async fn get(&self, path: &str, params: &QueryParams) -> Result<Value> {
        let request = TransportRequest::new(Method::Get, path).with_params(params.clone());
        self.send(request).await
    }

    /// Issues a POST request with a JSON body.
    pub async fn post(&self, path: &str, payload: Value) -> Result<Value> {
        let request = TransportRequest::new(Method::Post, path).with_body(payload);
        self.send(request).await
    }

    /// Issues a PUT request with a JSON body.
    pub async fn put(&self, path: &str, payload: Value) -> Result<Value> {
        let request = TransportRequest::new(Method::Put, path).with_body(payload);
        self.send(request).await
    }

    /// Issues a DELETE request.
    pub async fn delete(&self, path: &str, params: &QueryParams) -> Result<Value> {
        let request = TransportRequest::new(Method::Delete, path).with_params(params.clone());
        self.send(request).await
    }

    async fn send(&self, request: TransportRequest) -> Result<Value> {
        if request.method.is_mutating() && self.is_read_only() {
            return Err(Error::read_only().with_message(format!(
                "Cannot {} on read-only connection",
                request.method
            )));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            method = %request.method,
            path = %request.path,
            params = request.params.len(),
            "Sending request"
        );

        let method = request.method;
        let response = self.inner.transport.send(request).await;

        if let Err(error) = &response {
            tracing::warn!(
                target: TRACING_TARGET,
                method = %method,
                error = %error,
                "Request failed"
            );
        }

        response
    }
}
