//! Leaf stage that replays a queue of pre-built results
//!
//! Used to feed a stage tree from an in-memory document set and to script
//! exact sequences of states (stalls, yields, failures) in tests.

use std::collections::VecDeque;

use crate::document::{Document, RecordId};
use crate::working_set::{WorkingSet, WorkingSetId};

use super::stage::{PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct QueuedDataStage {
    results: VecDeque<StageState>,
    common: CommonStats,
}

impl QueuedDataStage {
    pub fn new() -> Self {
        Self {
            results: VecDeque::new(),
            common: CommonStats::new(StageType::QueuedData.as_str()),
        }
    }

    /// Queue a bare state or an already allocated result
    pub fn push_back(&mut self, state: StageState) {
        self.results.push_back(state);
    }

    /// Allocate an owned member holding `doc` and queue it as a result
    pub fn push_back_document(&mut self, ws: &mut WorkingSet, doc: Document) -> WorkingSetId {
        let id = ws.allocate();
        let member = ws.get_mut(id);
        member.set_document(doc);
        member.transition_to_owned_obj();
        self.results.push_back(StageState::Advanced(id));
        id
    }

    /// Allocate a member tied to a record and queue it as a result
    pub fn push_back_record(
        &mut self,
        ws: &mut WorkingSet,
        record_id: RecordId,
        doc: Document,
    ) -> WorkingSetId {
        let id = ws.allocate();
        let member = ws.get_mut(id);
        member.set_record_id(record_id);
        member.set_document(doc);
        self.results.push_back(StageState::Advanced(id));
        id
    }

    pub fn remaining(&self) -> usize {
        self.results.len()
    }
}

impl Default for QueuedDataStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanStage for QueuedDataStage {
    fn stage_type(&self) -> StageType {
        StageType::QueuedData
    }

    fn do_work(&mut self, _ws: &mut WorkingSet) -> StageState {
        self.results.pop_front().unwrap_or(StageState::NeedTime)
    }

    fn is_eof(&self) -> bool {
        self.results.is_empty()
    }

    fn common_stats(&self) -> &CommonStats {
        &self.common
    }

    fn common_stats_mut(&mut self) -> &mut CommonStats {
        &mut self.common
    }

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::QueuedData {
            remaining: self.results.len(),
        }
    }
}
