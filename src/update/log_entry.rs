//! Update log entry under construction
//!
//! Holds exactly one of: nothing yet, a delta with its format version, or a
//! full replacement document. Content is set once; a second set of either
//! kind is an invariant violation and panics.

use std::fmt;

use crate::document::{Document, Value};

use super::errors::UpdateEntryError;
use super::serialization::{
    extract_update_version, make_delta_entry, make_replacement_entry, UpdateOplogEntryVersion,
    DIFF_FIELD, VERSION_FIELD,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum UpdateLogEntry {
    #[default]
    Unset,
    Delta {
        version: UpdateOplogEntryVersion,
        diff: Document,
    },
    /// Untagged: replacements carry no version
    Replacement { doc: Document },
}

impl UpdateLogEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, UpdateLogEntry::Unset)
    }

    /// Record a delta. Panics if content was already set.
    pub fn set_delta(&mut self, diff: Document) {
        assert!(!self.is_set(), "update log entry already holds a {}", self);
        *self = UpdateLogEntry::Delta {
            version: UpdateOplogEntryVersion::DeltaV2,
            diff,
        };
    }

    /// Record a full replacement. Panics if content was already set.
    pub fn set_replacement(&mut self, doc: Document) {
        assert!(!self.is_set(), "update log entry already holds a {}", self);
        *self = UpdateLogEntry::Replacement { doc };
    }

    /// Format version; `None` for replacements and unset entries
    pub fn version(&self) -> Option<UpdateOplogEntryVersion> {
        match self {
            UpdateLogEntry::Delta { version, .. } => Some(*version),
            _ => None,
        }
    }

    pub fn to_document(&self) -> Result<Document, UpdateEntryError> {
        match self {
            UpdateLogEntry::Unset => Err(UpdateEntryError::NotSet),
            UpdateLogEntry::Delta { diff, .. } => Ok(make_delta_entry(diff)),
            UpdateLogEntry::Replacement { doc } => Ok(make_replacement_entry(doc)),
        }
    }

    pub fn from_document(entry: &Document) -> Result<Self, UpdateEntryError> {
        if let Some(v) = entry.get(VERSION_FIELD) {
            if extract_update_version(entry).is_none() {
                return Err(UpdateEntryError::UnknownVersion(v.to_string()));
            }
        }

        match extract_update_version(entry) {
            None => Ok(UpdateLogEntry::Replacement { doc: entry.clone() }),
            Some(UpdateOplogEntryVersion::DeltaV2) => {
                let diff = match entry.get(DIFF_FIELD) {
                    Some(Value::Object(diff)) => diff.clone(),
                    _ => {
                        return Err(UpdateEntryError::Malformed(
                            "delta entry requires an object diff field".into(),
                        ))
                    }
                };
                Ok(UpdateLogEntry::Delta {
                    version: UpdateOplogEntryVersion::DeltaV2,
                    diff,
                })
            }
            Some(other) => Err(UpdateEntryError::UnsupportedVersion(other.as_i64())),
        }
    }
}

impl fmt::Display for UpdateLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateLogEntry::Unset => write!(f, "unset entry"),
            UpdateLogEntry::Delta { version, .. } => write!(f, "delta ({})", version),
            UpdateLogEntry::Replacement { .. } => write!(f, "replacement"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::into_document;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        into_document(v).unwrap()
    }

    #[test]
    fn test_unset_does_not_serialize() {
        let entry = UpdateLogEntry::new();
        assert!(!entry.is_set());
        assert_eq!(entry.to_document(), Err(UpdateEntryError::NotSet));
    }

    #[test]
    fn test_delta_carries_version() {
        let mut entry = UpdateLogEntry::new();
        entry.set_delta(doc(json!({"u": {"a": 1}})));
        assert_eq!(entry.version(), Some(UpdateOplogEntryVersion::DeltaV2));

        let wire = entry.to_document().unwrap();
        assert_eq!(wire, doc(json!({"$v": 2, "diff": {"u": {"a": 1}}})));
    }

    #[test]
    fn test_replacement_has_no_version() {
        let mut entry = UpdateLogEntry::new();
        entry.set_replacement(doc(json!({"a": 1, "b": "x"})));
        assert_eq!(entry.version(), None);
        assert_eq!(entry.to_document().unwrap(), doc(json!({"a": 1, "b": "x"})));
    }

    #[test]
    #[should_panic(expected = "already holds a delta")]
    fn test_replacement_after_delta_panics() {
        let mut entry = UpdateLogEntry::new();
        entry.set_delta(Document::new());
        entry.set_replacement(Document::new());
    }

    #[test]
    #[should_panic(expected = "already holds a replacement")]
    fn test_delta_after_replacement_panics() {
        let mut entry = UpdateLogEntry::new();
        entry.set_replacement(Document::new());
        entry.set_delta(Document::new());
    }

    #[test]
    fn test_from_document_rejects_bad_input() {
        assert!(matches!(
            UpdateLogEntry::from_document(&doc(json!({"$v": 9}))),
            Err(UpdateEntryError::UnknownVersion(_))
        ));
        assert_eq!(
            UpdateLogEntry::from_document(&doc(json!({"$set": {"a": 1}}))),
            Err(UpdateEntryError::UnsupportedVersion(1))
        );
        assert!(matches!(
            UpdateLogEntry::from_document(&doc(json!({"$v": 2, "diff": 3}))),
            Err(UpdateEntryError::Malformed(_))
        ));
    }
}
