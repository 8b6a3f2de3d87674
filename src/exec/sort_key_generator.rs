//! Computes sort key metadata for each result
//!
//! Reads the pattern's paths from the member's document, or from its index
//! key metadata when the member carries no document. Missing paths yield
//! `null`.

use crate::document::{get_path, Document, Value};
use crate::working_set::{WorkingSet, WorkingSetMember};

use super::sort_pattern::SortPattern;
use super::stage::{BoxedPlanStage, PlanStage, StageState, StageType};
use super::stats::{CommonStats, SpecificStats};

pub struct SortKeyGeneratorStage {
    child: BoxedPlanStage,
    pattern: SortPattern,
    common: CommonStats,
}

impl SortKeyGeneratorStage {
    pub fn new(pattern: SortPattern, child: BoxedPlanStage) -> Self {
        Self {
            child,
            pattern,
            common: CommonStats::new(StageType::SortKeyGenerator.as_str()),
        }
    }

    fn source_document(member: &WorkingSetMember) -> Option<&Document> {
        member
            .document()
            .or_else(|| member.metadata().index_key())
            .or_else(|| member.key_data.first().map(|d| &d.key))
    }

    fn compute_sort_key(&self, member: &WorkingSetMember) -> Value {
        let lookup = |path: &str| -> Value {
            Self::source_document(member)
                .and_then(|doc| get_path(doc, path))
                .cloned()
                .unwrap_or(Value::Null)
        };

        let components = self.pattern.components();
        if components.len() == 1 {
            return lookup(&components[0].path);
        }
        Value::Array(components.iter().map(|c| lookup(&c.path)).collect())
    }
}

impl PlanStage for SortKeyGeneratorStage {
    fn stage_type(&self) -> StageType {
        StageType::SortKeyGenerator
    }

    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState {
        let state = self.child.work(ws);
        if let StageState::Advanced(id) = state {
            let key = self.compute_sort_key(ws.get(id));
            ws.get_mut(id).metadata_mut().set_sort_key(key);
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
        SpecificStats::SortKeyGenerator {
            sort_pattern: self.pattern.to_string(),
        }
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        vec![self.child.as_ref()]
    }
}
