//! Discards the first `n` results, then forwards everything

use crate::working_set::WorkingSet;

use super::stage::{BoxedPlanStage, PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct SkipStage {
    child: BoxedPlanStage,
    skip: u64,
    left_to_skip: u64,
    common: CommonStats,
}

impl SkipStage {
    pub fn new(skip: u64, child: BoxedPlanStage) -> Self {
        Self {
            child,
            skip,
            left_to_skip: skip,
            common: CommonStats::new(StageType::Skip.as_str()),
        }
    }
}

impl PlanStage for SkipStage {
    fn stage_type(&self) -> StageType {
        StageType::Skip
    }

    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState {
        let state = self.child.work(ws);

        if let StageState::Advanced(id) = state {
            if self.left_to_skip > 0 {
                self.left_to_skip -= 1;
                ws.free(id);
                return StageState::NeedTime;
            }
        }

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
        SpecificStats::Skip { skip: self.skip }
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        vec![self.child.as_ref()]
    }
}
