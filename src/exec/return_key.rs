//! Replaces each result with a document built from its key metadata
//!
//! The output document is the index key fields (if any) followed by one
//! field per configured sort key meta-field name, each bound to the
//! member's computed sort key. Meta-field names are field paths: `a.b`
//! nests the sort key under an embedded `a` object. The original document
//! and its storage ties are discarded.
//!
//! Requesting sort key meta-fields on a result with no computed sort key is
//! a misconfigured plan and fails the stage with `AERO_INTERNAL_ERROR`.

use crate::document::{set_path, Document};
use crate::observability::{log_event_with_fields, Event};
use crate::status::Status;
use crate::working_set::{WorkingSet, WorkingSetMember};

use super::stage::{BoxedPlanStage, PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct ReturnKeyStage {
    child: BoxedPlanStage,
    /// Output field names for the `sortKey` meta-projection. Empty if none.
    sort_key_meta_fields: Vec<String>,
    common: CommonStats,
}

impl ReturnKeyStage {
    pub fn new(sort_key_meta_fields: Vec<String>, child: BoxedPlanStage) -> Self {
        Self {
            child,
            sort_key_meta_fields,
            common: CommonStats::new(StageType::ReturnKey.as_str()),
        }
    }

    fn extract_index_key(&self, member: &mut WorkingSetMember) -> Result<(), Status> {
        if !self.sort_key_meta_fields.is_empty() && !member.metadata().has_sort_key() {
            return Err(Status::internal(
                "sortKey meta-projection requested but no data available",
            ));
        }

        let mut out = Document::new();

        if let Some(index_key) = member.metadata().index_key() {
            for (name, value) in index_key {
                out.insert(name.clone(), value.clone());
            }
        }

        if let Some(sort_key) = member.metadata().sort_key() {
            for field in &self.sort_key_meta_fields {
                set_path(&mut out, field, sort_key.clone());
            }
        }

        member.key_data.clear();
        member.record_id = None;
        member.set_document(out);
        member.transition_to_owned_obj();

        Ok(())
    }
}

impl PlanStage for ReturnKeyStage {
    fn stage_type(&self) -> StageType {
        StageType::ReturnKey
    }

    // No early EOF shortcut here: a tailable child may report EOF and still
    // produce more data later.
    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState {
        let state = self.child.work(ws);

        let StageState::Advanced(id) = state else {
            return state;
        };

        if let Err(status) = self.extract_index_key(ws.get_mut(id)) {
            log_event_with_fields(
                Event::ReturnKeyFailed,
                &[("code", status.code().code()), ("reason", status.reason())],
            );
            ws.free(id);
            return StageState::Failure(ws.allocate_status_member(status));
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
        SpecificStats::ReturnKey {
            sort_key_meta_fields: self.sort_key_meta_fields.clone(),
        }
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        vec![self.child.as_ref()]
    }
}
