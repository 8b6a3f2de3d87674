//! Streaming, order-preserving deduplication
//!
//! Forwards a child row only the first time its key projection is seen.
//! All of the child's slots pass through unchanged. Rows are never
//! buffered or reordered; the seen-set grows with the number of distinct
//! keys, so bound memory by placing a limit above this stage.

use std::collections::HashSet;

use crate::exec::{CommonStats, SpecificStats};

use super::stage::{assert_slots_resolve, BoxedSbeStage, PlanNodeId, PlanState, SbeStage};
use super::value::{MaterializedRow, SlotAccessor, SlotId, SlotVector};

pub struct UniqueStage {
    child: BoxedSbeStage,
    key_slots: SlotVector,
    seen: HashSet<MaterializedRow>,
    dupes_dropped: u64,
    common: CommonStats,
}

impl UniqueStage {
    pub fn new(child: BoxedSbeStage, key_slots: SlotVector, node_id: PlanNodeId) -> Self {
        Self {
            child,
            key_slots,
            seen: HashSet::new(),
            dupes_dropped: 0,
            common: CommonStats::with_node_id("unique", node_id),
        }
    }

    pub fn dupes_dropped(&self) -> u64 {
        self.dupes_dropped
    }

    fn current_key(&self) -> MaterializedRow {
        MaterializedRow::from_accessors(self.key_slots.iter().map(|slot| {
            self.child
                .get_accessor(*slot)
                .unwrap_or_else(|| panic!("unique: key slot s{} vanished after prepare", slot))
        }))
    }
}

impl SbeStage for UniqueStage {
    fn name(&self) -> &'static str {
        "unique"
    }

    fn prepare(&mut self) {
        self.child.prepare();
        assert_slots_resolve("unique", self.child.as_ref(), &self.key_slots);
    }

    fn get_accessor(&self, slot: SlotId) -> Option<&dyn SlotAccessor> {
        self.child.get_accessor(slot)
    }

    fn open(&mut self, re_open: bool) {
        self.common.opens += 1;
        self.common.is_eof = false;
        self.seen.clear();
        self.child.open(re_open);
    }

    fn get_next(&mut self) -> PlanState {
        loop {
            if self.child.get_next() == PlanState::IsEof {
                self.common.is_eof = true;
                return PlanState::IsEof;
            }

            let key = self.current_key();
            if self.seen.insert(key) {
                self.common.advanced += 1;
                return PlanState::Advanced;
            }
            self.dupes_dropped += 1;
        }
    }

    fn close(&mut self) {
        self.common.closes += 1;
        self.seen.clear();
        self.child.close();
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::Unique {
            dupes_dropped: self.dupes_dropped,
            keys_seen: self.seen.len(),
        }
    }

    fn children(&self) -> Vec<&dyn SbeStage> {
        vec![self.child.as_ref()]
    }

    fn debug_slots(&self) -> Vec<SlotId> {
        self.key_slots.clone()
    }
}
