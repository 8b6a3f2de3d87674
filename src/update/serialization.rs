//! Wire form of update log entries
//!
//! - Delta (`$v: 2`): `{"$v": 2, "diff": {"u": {...}, "i": {...}, "d": {...}}}`
//! - Legacy modifier (`$v: 1`, `$v` optional): `{"$set": {...}, "$unset": {...}}`
//! - Replacement: the new document itself, with no `$v`

use std::fmt;

use crate::document::{Document, Value};

pub const VERSION_FIELD: &str = "$v";
pub const DIFF_FIELD: &str = "diff";

const DIFF_UPDATE_SECTION: &str = "u";
const DIFF_INSERT_SECTION: &str = "i";
const DIFF_DELETE_SECTION: &str = "d";

/// Format version of a modifier-style update entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOplogEntryVersion {
    UpdateNodeV1 = 1,
    DeltaV2 = 2,
}

impl UpdateOplogEntryVersion {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }

    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(UpdateOplogEntryVersion::UpdateNodeV1),
            2 => Some(UpdateOplogEntryVersion::DeltaV2),
            _ => None,
        }
    }
}

impl fmt::Display for UpdateOplogEntryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$v:{}", self.as_i64())
    }
}

pub fn make_delta_entry(diff: &Document) -> Document {
    let mut entry = Document::new();
    entry.insert(
        VERSION_FIELD.to_string(),
        Value::from(UpdateOplogEntryVersion::DeltaV2.as_i64()),
    );
    entry.insert(DIFF_FIELD.to_string(), Value::Object(diff.clone()));
    entry
}

pub fn make_replacement_entry(replacement: &Document) -> Document {
    replacement.clone()
}

/// Version of an update entry, `None` for replacements and unknown versions
///
/// `$v: 1` entries may omit `$v`; those are recognized by a `$`-prefixed
/// first field.
pub fn extract_update_version(entry: &Document) -> Option<UpdateOplogEntryVersion> {
    match entry.get(VERSION_FIELD) {
        None => entry
            .keys()
            .next()
            .filter(|name| name.starts_with('$'))
            .map(|_| UpdateOplogEntryVersion::UpdateNodeV1),
        Some(v) => v.as_i64().and_then(UpdateOplogEntryVersion::from_i64),
    }
}

fn modifier_version(entry: &Document, field_name: &str) -> UpdateOplogEntryVersion {
    assert!(!field_name.contains('.'), "field name cannot contain dots");
    extract_update_version(entry).unwrap_or_else(|| {
        panic!(
            "not a modifier-style update entry: {}",
            Value::Object(entry.clone())
        )
    })
}

fn object_section<'a>(entry: &'a Document, name: &str) -> Option<&'a Document> {
    entry.get(name).map(|v| {
        v.as_object()
            .unwrap_or_else(|| panic!("update entry section {} must be an object", name))
    })
}

fn diff_section<'a>(entry: &'a Document) -> &'a Document {
    entry
        .get(DIFF_FIELD)
        .and_then(Value::as_object)
        .unwrap_or_else(|| panic!("every $v:2 update entry needs an object diff field"))
}

/// New value a top-level field receives from a modifier-style update, if
/// the update sets it. Panics on dotted names and on replacement entries.
pub fn extract_new_value_for_field<'a>(
    entry: &'a Document,
    field_name: &str,
) -> Option<&'a Value> {
    match modifier_version(entry, field_name) {
        UpdateOplogEntryVersion::UpdateNodeV1 => {
            object_section(entry, "$set").and_then(|set| set.get(field_name))
        }
        UpdateOplogEntryVersion::DeltaV2 => {
            let diff = diff_section(entry);
            [DIFF_UPDATE_SECTION, DIFF_INSERT_SECTION]
                .iter()
                .filter_map(|section| object_section(diff, section))
                .find_map(|section| section.get(field_name))
        }
    }
}

/// Whether a modifier-style update removes a top-level field. Panics on
/// dotted names and on replacement entries.
pub fn is_field_removed_by_update(entry: &Document, field_name: &str) -> bool {
    match modifier_version(entry, field_name) {
        UpdateOplogEntryVersion::UpdateNodeV1 => object_section(entry, "$unset")
            .map(|unset| unset.contains_key(field_name))
            .unwrap_or(false),
        UpdateOplogEntryVersion::DeltaV2 => object_section(diff_section(entry), DIFF_DELETE_SECTION)
            .map(|deletes| deletes.contains_key(field_name))
            .unwrap_or(false),
    }
}
