//! Dataset metadata documents.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::record::Record;

/// One column description from a metadata document.
///
/// Keys the platform adds beyond these are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    /// Numeric column id.
    pub id: Option<i64>,
    /// Human readable column name.
    pub name: Option<String>,
    /// Name used for the column in queries.
    pub field_name: Option<String>,
    /// Platform data type, e.g. `text` or `number`.
    pub data_type_name: Option<String>,
    /// Column description.
    pub description: Option<String>,
    /// Display position.
    pub position: Option<i64>,
}

/// Metadata for one dataset.
///
/// Wraps the document as served by the platform. Typed accessors cover the
/// common fields; anything else is reachable through [`Metadata::get`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    raw: Record,
}

impl Metadata {
    /// Wraps a metadata document.
    pub fn new(raw: Record) -> Self {
        Self { raw }
    }

    /// Returns a top-level field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// Id of the dataset this metadata describes.
    pub fn resource_id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Dataset name.
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// Dataset description.
    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    /// Display type, e.g. `table` or `map`.
    pub fn display_type(&self) -> Option<&str> {
        self.get_str("displayType")
    }

    /// Dataset category.
    pub fn category(&self) -> Option<&str> {
        self.get_str("category")
    }

    /// Dataset tags; empty when none are set.
    pub fn tags(&self) -> Vec<&str> {
        self.get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Column descriptions; entries that are not objects are skipped.
    pub fn columns(&self) -> Vec<Column> {
        self.get("columns")
            .and_then(Value::as_array)
            .map(|columns| {
                columns
                    .iter()
                    .filter(|c| c.is_object())
                    .filter_map(|c| Column::deserialize(c).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the column with the given numeric id.
    pub fn column_by_id(&self, id: i64) -> Option<Column> {
        self.columns().into_iter().find(|c| c.id == Some(id))
    }

    /// Numeric id of the column that identifies each row.
    pub fn row_identifier_column_id(&self) -> Option<i64> {
        self.get("rowIdentifierColumnId").and_then(Value::as_i64)
    }

    /// The column that identifies each row.
    pub fn row_identifier_column(&self) -> Option<Column> {
        self.row_identifier_column_id()
            .and_then(|id| self.column_by_id(id))
    }

    /// Returns `true` if any string or number anywhere in the document
    /// contains `term`, ignoring case.
    pub fn contains(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.raw.values().any(|value| value_contains(value, &term))
    }

    /// Borrows the underlying document.
    pub fn as_raw(&self) -> &Record {
        &self.raw
    }

    /// Returns the underlying document.
    pub fn into_raw(self) -> Record {
        self.raw
    }

    /// Encodes the document as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.raw)?)
    }
}

fn value_contains(value: &Value, term: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(term),
        Value::Number(n) => n.to_string().contains(term),
        Value::Array(values) => values.iter().any(|v| value_contains(v, term)),
        Value::Object(map) => map.values().any(|v| value_contains(v, term)),
        Value::Null | Value::Bool(_) => false,
    }
}

impl From<Record> for Metadata {
    fn from(raw: Record) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.resource_id().unwrap_or_default(),
            self.name().unwrap_or_default()
        )
    }
}
