//! Listing and lookup of dataset metadata.

use std::collections::BTreeMap;

use super::{Metadata, TRACING_TARGET};
use crate::connection::{Connection, METADATA_BASE_PATH};
use crate::params::QueryParams;
use crate::record::decode_records;
use crate::Result;

/// Metadata catalog of one data portal.
#[derive(Debug, Clone)]
pub struct MetadataCatalog {
    connection: Connection,
}

impl MetadataCatalog {
    /// Creates a catalog reading through `connection`.
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Lists every dataset's metadata in the order the portal returns it.
    pub async fn list(&self) -> Result<Vec<Metadata>> {
        let body = self
            .connection
            .get(METADATA_BASE_PATH, &QueryParams::new())
            .await?;
        let metadata: Vec<Metadata> = decode_records(body)?
            .into_iter()
            .map(Metadata::new)
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            datasets = metadata.len(),
            "Listed metadata"
        );

        Ok(metadata)
    }

    /// Returns every dataset's metadata keyed by dataset id.
    ///
    /// Entries without an id are skipped.
    pub async fn all(&self) -> Result<BTreeMap<String, Metadata>> {
        let all = self
            .list()
            .await?
            .into_iter()
            .filter_map(|meta| Some((meta.resource_id()?.to_owned(), meta)))
            .collect();
        Ok(all)
    }

    /// Fetches the metadata of one dataset.
    pub async fn resource(&self, resource_id: &str) -> Result<Metadata> {
        let path = format!("{METADATA_BASE_PATH}/{resource_id}.json");
        let body = self.connection.get(&path, &QueryParams::new()).await?;
        let raw = serde_json::from_value(body)?;
        Ok(Metadata::new(raw))
    }

    /// Returns the entries whose values contain `term`, ignoring case.
    ///
    /// Searches `records` when given, otherwise a fresh [`list`](Self::list).
    /// Matches keep their input order.
    pub async fn search(&self, term: &str, records: Option<&[Metadata]>) -> Result<Vec<Metadata>> {
        let matches = match records {
            Some(records) => filter_matches(records.iter().cloned(), term),
            None => filter_matches(self.list().await?, term),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            term,
            matches = matches.len(),
            "Searched metadata"
        );

        Ok(matches)
    }
}

fn filter_matches(records: impl IntoIterator<Item = Metadata>, term: &str) -> Vec<Metadata> {
    records
        .into_iter()
        .filter(|meta| meta.contains(term))
        .collect()
}
