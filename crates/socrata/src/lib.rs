#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod record;

pub mod connection;
pub mod metadata;
pub mod params;
pub mod resource;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use connection::{ABSOLUTE_MAXIMUM_CHUNK_SIZE, Connection, ConnectionConfig, Credentials};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use metadata::{Column, Metadata, MetadataCatalog};
pub use params::QueryParams;
pub use record::{DELETED_FIELD, INTERNAL_ID, Record};
#[cfg(feature = "reqwest")]
pub use self::reqwest::{ReqwestClient, ReqwestConfig};
pub use resource::{BAILOUT, Chunk, ChunkControl, FETCH_ALL, Resource, SortDirection};
pub use transport::{Method, Transport, TransportRequest};
