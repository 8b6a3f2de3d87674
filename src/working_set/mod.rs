//! Working set arena for aeroexec
//!
//! The working set owns every in-flight document of one execution behind
//! stable integer handles. Stages pass handles to each other instead of
//! documents.
//!
//! # Invariants
//!
//! - Handles are unique while live
//! - A freed handle may be handed out again by a later `allocate`
//! - Using a freed handle is a programming error and panics
//! - One working set belongs to exactly one execution; it is passed
//!   explicitly to every stage and never shared across threads

mod member;

pub use member::{DocumentMetadata, IndexKeyDatum, MemberState, WorkingSetMember};

use std::fmt;

use serde::Serialize;

use crate::status::Status;

/// Handle to a working set member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WorkingSetId(u32);

impl WorkingSetId {
    /// Sentinel that never refers to a live member
    pub const INVALID: WorkingSetId = WorkingSetId(u32::MAX);

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WorkingSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "wsid:{}", self.0)
        } else {
            write!(f, "wsid:INVALID")
        }
    }
}

/// Free-list backed pool of working set members
#[derive(Debug, Default)]
pub struct WorkingSet {
    slots: Vec<Option<WorkingSetMember>>,
    free_list: Vec<WorkingSetId>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zeroed member, reusing a freed handle when one is available
    pub fn allocate(&mut self) -> WorkingSetId {
        if let Some(id) = self.free_list.pop() {
            self.slots[id.index()] = Some(WorkingSetMember::new());
            return id;
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|i| *i != u32::MAX)
            .unwrap_or_else(|| panic!("working set exhausted its handle space"));
        self.slots.push(Some(WorkingSetMember::new()));
        WorkingSetId(index)
    }

    /// Borrow a live member
    pub fn get(&self, id: WorkingSetId) -> &WorkingSetMember {
        self.slots
            .get(id.index())
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("use of dead working set handle {}", id))
    }

    /// Mutably borrow a live member
    pub fn get_mut(&mut self, id: WorkingSetId) -> &mut WorkingSetMember {
        self.slots
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("use of dead working set handle {}", id))
    }

    /// Return a member to the pool. The handle is dead afterwards.
    pub fn free(&mut self, id: WorkingSetId) {
        let slot = self
            .slots
            .get_mut(id.index())
            .unwrap_or_else(|| panic!("free of unknown working set handle {}", id));
        if slot.take().is_none() {
            panic!("double free of working set handle {}", id);
        }
        self.free_list.push(id);
    }

    /// Whether a handle currently refers to a live member
    pub fn is_live(&self, id: WorkingSetId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    /// Number of live members
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Allocate a member that carries error detail for a `FAILURE` result
    pub fn allocate_status_member(&mut self, status: Status) -> WorkingSetId {
        let id = self.allocate();
        self.get_mut(id).set_status(status);
        id
    }

    /// Free every member
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RecordId;

    #[test]
    fn test_allocate_unique_handles() {
        let mut ws = WorkingSet::new();
        let a = ws.allocate();
        let b = ws.allocate();
        assert_ne!(a, b);
        assert_eq!(ws.live_count(), 2);
    }

    #[test]
    fn test_freed_handle_is_reused_with_zeroed_member() {
        let mut ws = WorkingSet::new();
        let a = ws.allocate();
        ws.get_mut(a).set_record_id(RecordId(9));
        ws.free(a);
        assert!(!ws.is_live(a));

        let b = ws.allocate();
        assert_eq!(a, b);
        assert_eq!(ws.get(b).state(), MemberState::Unset);
        assert!(ws.get(b).record_id.is_none());
    }

    #[test]
    #[should_panic(expected = "dead working set handle")]
    fn test_get_after_free_panics() {
        let mut ws = WorkingSet::new();
        let a = ws.allocate();
        ws.free(a);
        ws.get(a);
    }

    #[test]
    #[should_panic(expected = "double free")]
    fn test_double_free_panics() {
        let mut ws = WorkingSet::new();
        let a = ws.allocate();
        ws.free(a);
        ws.free(a);
    }

    #[test]
    #[should_panic(expected = "dead working set handle")]
    fn test_invalid_handle_panics() {
        let ws = WorkingSet::new();
        ws.get(WorkingSetId::INVALID);
    }

    #[test]
    fn test_status_member() {
        let mut ws = WorkingSet::new();
        let id = ws.allocate_status_member(Status::internal("boom"));
        assert_eq!(ws.get(id).status().map(|s| s.reason()), Some("boom"));
    }

    #[test]
    fn test_invalid_display() {
        assert_eq!(WorkingSetId::INVALID.to_string(), "wsid:INVALID");
        assert!(!WorkingSetId::INVALID.is_valid());
    }
}
