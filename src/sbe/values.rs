//! Leaf stage producing literal rows

use crate::document::Value;
use crate::exec::{CommonStats, SpecificStats};

use super::stage::{PlanNodeId, PlanState, SbeStage};
use super::value::{OwnedValueAccessor, SlotAccessor, SlotId, SlotVector};

pub struct ValuesStage {
    slots: SlotVector,
    rows: Vec<Vec<Value>>,
    accessors: Vec<OwnedValueAccessor>,
    pos: usize,
    is_open: bool,
    common: CommonStats,
}

impl ValuesStage {
    /// Every row must have one value per slot
    pub fn new(slots: SlotVector, rows: Vec<Vec<Value>>, node_id: PlanNodeId) -> Self {
        for (idx, row) in rows.iter().enumerate() {
            assert_eq!(
                row.len(),
                slots.len(),
                "values row {} has {} values for {} slots",
                idx,
                row.len(),
                slots.len()
            );
        }
        let accessors = slots.iter().map(|_| OwnedValueAccessor::new()).collect();
        Self {
            slots,
            rows,
            accessors,
            pos: 0,
            is_open: false,
            common: CommonStats::with_node_id("values", node_id),
        }
    }
}

impl SbeStage for ValuesStage {
    fn name(&self) -> &'static str {
        "values"
    }

    fn prepare(&mut self) {}

    fn get_accessor(&self, slot: SlotId) -> Option<&dyn SlotAccessor> {
        self.slots
            .iter()
            .position(|s| *s == slot)
            .map(|idx| &self.accessors[idx] as &dyn SlotAccessor)
    }

    fn open(&mut self, re_open: bool) {
        assert!(re_open || !self.is_open, "values opened twice without close");
        self.common.opens += 1;
        self.pos = 0;
        self.common.is_eof = false;
        self.is_open = true;
    }

    fn get_next(&mut self) -> PlanState {
        assert!(self.is_open, "values get_next before open");
        let Some(row) = self.rows.get(self.pos) else {
            self.common.is_eof = true;
            return PlanState::IsEof;
        };
        for (accessor, value) in self.accessors.iter_mut().zip(row.iter()) {
            accessor.reset(value.clone());
        }
        self.pos += 1;
        self.common.advanced += 1;
        PlanState::Advanced
    }

    fn close(&mut self) {
        self.common.closes += 1;
        self.is_open = false;
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::Values {
            rows: self.rows.len(),
        }
    }

    fn children(&self) -> Vec<&dyn SbeStage> {
        Vec::new()
    }

    fn debug_slots(&self) -> Vec<SlotId> {
        self.slots.clone()
    }
}
