//! Working set members
//!
//! A member is one in-flight document during execution. It is in exactly one
//! completeness state at a time:
//!
//! - `Unset` - freshly allocated, nothing attached
//! - `HasRecordId` - tied to a storage location (record id and/or index keys)
//! - `OwnedObj` - owns a fully materialized document, no storage ties

use serde::Serialize;

use crate::document::{Document, RecordId, Value};
use crate::status::Status;

/// Completeness state of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MemberState {
    /// Nothing attached yet
    #[default]
    Unset,
    /// Tied to a record in storage
    HasRecordId,
    /// Owns its document outright
    OwnedObj,
}

/// One index key a member was produced from
#[derive(Debug, Clone, PartialEq)]
pub struct IndexKeyDatum {
    /// Key pattern of the index, e.g. `{"a": 1}`
    pub key_pattern: Document,
    /// Raw key values keyed by the pattern's field names
    pub key: Document,
}

impl IndexKeyDatum {
    pub fn new(key_pattern: Document, key: Document) -> Self {
        Self { key_pattern, key }
    }
}

/// Computed metadata side-table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    sort_key: Option<Value>,
    index_key: Option<Document>,
}

impl DocumentMetadata {
    pub fn has_sort_key(&self) -> bool {
        self.sort_key.is_some()
    }

    pub fn sort_key(&self) -> Option<&Value> {
        self.sort_key.as_ref()
    }

    pub fn set_sort_key(&mut self, key: Value) {
        self.sort_key = Some(key);
    }

    pub fn has_index_key(&self) -> bool {
        self.index_key.is_some()
    }

    pub fn index_key(&self) -> Option<&Document> {
        self.index_key.as_ref()
    }

    pub fn set_index_key(&mut self, key: Document) {
        self.index_key = Some(key);
    }

    pub fn clear(&mut self) {
        self.sort_key = None;
        self.index_key = None;
    }
}

/// A slot in the working set arena
#[derive(Debug, Clone, Default)]
pub struct WorkingSetMember {
    state: MemberState,
    /// Storage location, if any
    pub record_id: Option<RecordId>,
    /// Index keys the member was read from
    pub key_data: Vec<IndexKeyDatum>,
    doc: Option<Document>,
    metadata: DocumentMetadata,
    status: Option<Status>,
}

impl WorkingSetMember {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current completeness state
    pub fn state(&self) -> MemberState {
        self.state
    }

    /// Attach a storage location. Only valid on an unset member.
    pub fn set_record_id(&mut self, record_id: RecordId) {
        assert!(
            self.state != MemberState::OwnedObj,
            "cannot attach a record id to an owned working set member"
        );
        self.record_id = Some(record_id);
        self.state = MemberState::HasRecordId;
    }

    /// Attach index key data. Ties the member to storage.
    pub fn add_key_data(&mut self, datum: IndexKeyDatum) {
        assert!(
            self.state != MemberState::OwnedObj,
            "cannot attach index keys to an owned working set member"
        );
        self.key_data.push(datum);
        self.state = MemberState::HasRecordId;
    }

    /// Set the document without changing the completeness state
    pub fn set_document(&mut self, doc: Document) {
        self.doc = Some(doc);
    }

    pub fn has_document(&self) -> bool {
        self.doc.is_some()
    }

    pub fn document(&self) -> Option<&Document> {
        self.doc.as_ref()
    }

    pub fn take_document(&mut self) -> Option<Document> {
        self.doc.take()
    }

    pub fn has_record_id(&self) -> bool {
        self.record_id.is_some()
    }

    /// Transition to owning the attached document outright.
    ///
    /// Clears record id and key data ties to the original storage location.
    pub fn transition_to_owned_obj(&mut self) {
        assert!(
            self.doc.is_some(),
            "working set member must hold a document before becoming owned"
        );
        self.record_id = None;
        self.key_data.clear();
        self.state = MemberState::OwnedObj;
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut DocumentMetadata {
        &mut self.metadata
    }

    /// Error detail, if this member was allocated to carry a failure
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }
}
