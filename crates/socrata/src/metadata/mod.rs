//! Dataset metadata and the portal's metadata catalog.

mod catalog;
mod record;

pub use self::catalog::MetadataCatalog;
pub use self::record::{Column, Metadata};

/// Tracing target for metadata operations.
pub const TRACING_TARGET: &str = "socrata::metadata";
