//! Forwards at most the first `n` results

use crate::working_set::WorkingSet;

use super::stage::{BoxedPlanStage, PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct LimitStage {
    child: BoxedPlanStage,
    limit: u64,
    num_to_return: u64,
    common: CommonStats,
}

impl LimitStage {
    pub fn new(limit: u64, child: BoxedPlanStage) -> Self {
        Self {
            child,
            limit,
            num_to_return: limit,
            common: CommonStats::new(StageType::Limit.as_str()),
        }
    }
}

impl PlanStage for LimitStage {
    fn stage_type(&self) -> StageType {
        StageType::Limit
    }

    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState {
        let state = self.child.work(ws);
        if state.is_advanced() {
            self.num_to_return -= 1;
        }
        state
    }

    fn is_eof(&self) -> bool {
        self.num_to_return == 0 || self.child.is_eof()
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn common_stats_mut(&mut self) -> &mut CommonStats {
        &mut self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::Limit { limit: self.limit }
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        vec![self.child.as_ref()]
    }
}
