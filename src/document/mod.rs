//! Document model for aeroexec
//!
//! Documents are opaque to the execution engine. They are carried as
//! `serde_json` values with insertion-ordered objects so that stages which
//! build output documents (return key) produce fields in a stable order.
//!
//! This module provides:
//! - `Document` and `Value` aliases
//! - `RecordId` - storage location of a document
//! - A canonical total order over values (`compare_values`)
//! - Hashing consistent with that order (`hash_value`)
//! - Dotted path lookup and assignment (`get_path`, `set_path`)

mod compare;

pub use compare::{compare_values, hash_value, values_equal};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque document value
pub type Value = serde_json::Value;

/// An ordered field map
pub type Document = serde_json::Map<String, Value>;

/// Storage record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Returns the raw record number
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

/// Looks up a dotted path (`a.b.c`) in a document.
///
/// Only traverses embedded objects. Array elements are not expanded.
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = doc.get(first)?;

    for part in parts {
        current = current.as_object()?.get(part)?;
    }

    Some(current)
}

/// Sets a dotted path (`a.b.c`), creating embedded objects along the way.
///
/// A non-object value sitting on an intermediate component is replaced by
/// an object.
pub fn set_path(doc: &mut Document, path: &str, value: Value) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop().unwrap_or(path);

    let mut current = doc;
    for part in parts {
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Document::new()));
        if !slot.is_object() {
            *slot = Value::Object(Document::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just made an object"),
        };
    }
    current.insert(last.to_string(), value);
}

/// Converts a value into a document, if it is an object
pub fn into_document(value: Value) -> Option<Document> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        into_document(value).unwrap()
    }

    #[test]
    fn test_get_top_level_path() {
        let d = doc(json!({"a": 1, "b": "x"}));
        assert_eq!(get_path(&d, "a"), Some(&json!(1)));
        assert_eq!(get_path(&d, "b"), Some(&json!("x")));
        assert_eq!(get_path(&d, "c"), None);
    }

    #[test]
    fn test_get_nested_path() {
        let d = doc(json!({"a": {"b": {"c": true}}}));
        assert_eq!(get_path(&d, "a.b.c"), Some(&json!(true)));
        assert_eq!(get_path(&d, "a.b"), Some(&json!({"c": true})));
        assert_eq!(get_path(&d, "a.x.c"), None);
    }

    #[test]
    fn test_path_through_scalar_is_missing() {
        let d = doc(json!({"a": 5}));
        assert_eq!(get_path(&d, "a.b"), None);
    }

    #[test]
    fn test_set_path_builds_nested_objects() {
        let mut d = doc(json!({"a": {"x": 1}, "s": 5}));
        set_path(&mut d, "a.b.c", json!(2));
        set_path(&mut d, "s.t", json!(3));
        set_path(&mut d, "top", json!(4));
        assert_eq!(
            Value::Object(d),
            json!({"a": {"x": 1, "b": {"c": 2}}, "s": {"t": 3}, "top": 4})
        );
    }

    #[test]
    fn test_into_document_rejects_scalars() {
        assert!(into_document(json!(1)).is_none());
        assert!(into_document(json!({"a": 1})).is_some());
    }

    #[test]
    fn test_document_preserves_insertion_order() {
        let mut d = Document::new();
        d.insert("z".into(), json!(1));
        d.insert("a".into(), json!(2));
        let keys: Vec<_> = d.keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }
}
