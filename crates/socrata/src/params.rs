//! SoQL query parameters.
//!
//! The platform reads its query language from a fixed set of `$`-prefixed
//! parameter names. [`QueryParams`] keeps them in insertion order so the
//! same builder state always produces the same query string.

use serde::Serialize;

/// Column projection, comma separated.
pub const SELECT: &str = "$select";
/// Row filter, clauses joined with ` AND `.
pub const WHERE: &str = "$where";
/// Sort order, comma separated `field DIRECTION` pairs.
pub const ORDER: &str = "$order";
/// Grouping columns, comma separated.
pub const GROUP: &str = "$group";
/// Full text search term.
pub const TEXT_SEARCH: &str = "$q";
/// Maximum number of rows to return.
pub const LIMIT: &str = "$limit";
/// Number of rows to skip.
pub const OFFSET: &str = "$offset";

/// Ordered, flat set of query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Adds a parameter and returns the set, for literal construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value of `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parses the value of `key` as an unsigned integer.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
