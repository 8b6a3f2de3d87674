//! Streaming sort-order guard
//!
//! Sits above a subtree that should emit results in sort key order but may
//! occasionally emit one out of order. Any result whose sort key sorts
//! strictly before the last accepted key is freed and counted as dropped.

use crate::document::Value;
use crate::working_set::WorkingSet;

use super::sort_pattern::{SortKeyComparator, SortPattern};
use super::stage::{BoxedPlanStage, PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct EnsureSortedStage {
    child: BoxedPlanStage,
    comparator: SortKeyComparator,
    /// Sort key of the last result passed up
    prev_sort_key: Option<Value>,
    n_dropped: u64,
    common: CommonStats,
}

impl EnsureSortedStage {
    pub fn new(pattern: &SortPattern, child: BoxedPlanStage) -> Self {
        Self {
            child,
            comparator: SortKeyComparator::new(pattern),
            prev_sort_key: None,
            n_dropped: 0,
            common: CommonStats::new(StageType::EnsureSorted.as_str()),
        }
    }

    pub fn n_dropped(&self) -> u64 {
        self.n_dropped
    }

    fn is_in_order(&self, lhs: &Value, rhs: &Value) -> bool {
        self.comparator.compare(lhs, rhs).is_le()
    }
}

impl PlanStage for EnsureSortedStage {
    fn stage_type(&self) -> StageType {
        StageType::EnsureSorted
    }

    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState {
        let state = self.child.work(ws);

        let StageState::Advanced(id) = state else {
            return state;
        };

        let cur_sort_key = ws
            .get(id)
            .metadata()
            .sort_key()
            .cloned()
            .unwrap_or_else(|| {
                panic!("{} requires a sort key on every result", StageType::EnsureSorted)
            });

        if let Some(prev) = &self.prev_sort_key {
            if !self.is_in_order(prev, &cur_sort_key) {
                ws.free(id);
                self.n_dropped += 1;
                return StageState::NeedTime;
            }
        }

        self.prev_sort_key = Some(cur_sort_key);
        state
    }

    fn is_eof(&self) -> bool {
        self.child.is_eof()
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn common_stats_mut(&mut self) -> &mut CommonStats {
        &mut self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::EnsureSorted {
            n_dropped: self.n_dropped,
        }
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        vec![self.child.as_ref()]
    }
}
