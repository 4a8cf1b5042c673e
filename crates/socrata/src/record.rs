//! Loosely-typed dataset rows.

use serde_json::{Map, Value};

/// One dataset row (or metadata document) as decoded from the platform.
///
/// The shape is defined by the dataset, not by this crate.
pub type Record = Map<String, Value>;

/// System field holding the platform's internal row identifier.
pub const INTERNAL_ID: &str = ":id";

/// System field that turns an upserted row into a deletion.
pub const DELETED_FIELD: &str = ":deleted";

/// Decodes a response body into a sequence of records.
pub(crate) fn decode_records(value: Value) -> crate::Result<Vec<Record>> {
    match value {
        Value::Null => Ok(Vec::new()),
        other => Ok(serde_json::from_value(other)?),
    }
}

/// Flags every record in `records` for deletion.
pub(crate) fn mark_deleted(records: &mut [Record]) {
    for record in records {
        record.insert(DELETED_FIELD.to_owned(), Value::Bool(true));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_decode_array_of_objects() {
        let records = decode_records(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["a"], json!(2));
    }

    #[test]
    fn test_decode_null_is_empty() {
        assert!(decode_records(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_object() {
        let error = decode_records(json!({"error": true})).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Serialization);
    }

    #[test]
    fn test_mark_deleted() {
        let mut records = vec![Record::new(), Record::new()];
        mark_deleted(&mut records);
        assert!(records.iter().all(|r| r[DELETED_FIELD] == json!(true)));
    }
}
