//! Stage statistics
//!
//! Every stage keeps cumulative counters. `PlanStageStats` is the mirrored
//! stats tree produced by a read-only recursive walk of the stage tree and
//! is what explain output serializes.

use serde::Serialize;

use super::stage::StageState;

/// Counters shared by every stage kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommonStats {
    /// Stage name, e.g. `ENSURE_SORTED`
    pub stage_type: &'static str,
    /// Plan node id, slot-based stages only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<u32>,
    pub works: u64,
    pub advanced: u64,
    pub need_time: u64,
    pub need_yield: u64,
    pub opens: u64,
    pub closes: u64,
    pub failed: bool,
    pub is_eof: bool,
}

impl CommonStats {
    pub fn new(stage_type: &'static str) -> Self {
        Self {
            stage_type,
            ..Self::default()
        }
    }

    pub fn with_node_id(stage_type: &'static str, node_id: u32) -> Self {
        Self {
            stage_type,
            node_id: Some(node_id),
            ..Self::default()
        }
    }

    /// Account for one unit of work that returned `state`
    pub fn record(&mut self, state: &StageState) {
        self.works += 1;
        match state {
            StageState::Advanced(_) => self.advanced += 1,
            StageState::NeedTime => self.need_time += 1,
            StageState::NeedYield => self.need_yield += 1,
            StageState::Failure(_) => self.failed = true,
        }
    }
}

/// Per-stage-kind statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecificStats {
    None,
    EnsureSorted { n_dropped: u64 },
    Limit { limit: u64 },
    Skip { skip: u64 },
    ReturnKey { sort_key_meta_fields: Vec<String> },
    SortKeyGenerator { sort_pattern: String },
    QueuedData { remaining: usize },
    Unique { dupes_dropped: u64, keys_seen: usize },
    MergeSort { branches: usize },
    Values { rows: usize },
}

/// Mirrored stats tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStageStats {
    pub common: CommonStats,
    pub specific: SpecificStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanStageStats>,
}

impl PlanStageStats {
    /// Depth-first search for the first stats node of a stage type
    pub fn find(&self, stage_type: &str) -> Option<&PlanStageStats> {
        if self.common.stage_type == stage_type {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(stage_type))
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PlanStageStats::node_count).sum::<usize>()
    }

    /// Render as pretty JSON for explain output
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
