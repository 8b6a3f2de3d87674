//! Slot-based stage protocol
//!
//! Lifecycle: `prepare` once, then `open`, repeated `get_next` until
//! `IsEof`, then `close`. A closed stage may be opened again with
//! `re_open = true` to re-execute from the start.

use std::fmt;

use crate::exec::{CommonStats, PlanStageStats, SpecificStats};

use super::value::{SlotAccessor, SlotId};

/// Plan node identifier
pub type PlanNodeId = u32;

/// Result of one `get_next` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanState {
    /// The stage's output slots hold a new row
    Advanced,
    IsEof,
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanState::Advanced => write!(f, "ADVANCED"),
            PlanState::IsEof => write!(f, "IS_EOF"),
        }
    }
}

/// Boxed slot-based stage with exclusive ownership
pub type BoxedSbeStage = Box<dyn SbeStage>;

pub trait SbeStage {
    /// Short lowercase stage name used in debug output
    fn name(&self) -> &'static str;

    /// Resolve input slots against children. Panics on a slot no child produces.
    fn prepare(&mut self);

    /// Accessor for `slot`, if this stage or a descendant produces it
    fn get_accessor(&self, slot: SlotId) -> Option<&dyn SlotAccessor>;

    fn open(&mut self, re_open: bool);

    fn get_next(&mut self) -> PlanState;

    fn close(&mut self);

    fn common_stats(&self) -> &CommonStats;

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::None
    }

    fn children(&self) -> Vec<&dyn SbeStage>;

    /// Slots shown in the debug line
    fn debug_slots(&self) -> Vec<SlotId>;

    fn get_stats(&self) -> PlanStageStats {
        PlanStageStats {
            common: self.common_stats().clone(),
            specific: self.specific_stats(),
            children: self.children().iter().map(|c| c.get_stats()).collect(),
        }
    }
}

/// Render a stage subtree, one stage per line, children indented:
///
/// ```text
/// [2] unique [s1]
///   [1] values [s1, s2]
/// ```
pub fn debug_print(stage: &dyn SbeStage) -> String {
    let mut out = String::new();
    write_debug(stage, 0, &mut out);
    out
}

fn write_debug(stage: &dyn SbeStage, depth: usize, out: &mut String) {
    if depth > 0 {
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    if let Some(node_id) = stage.common_stats().node_id {
        out.push_str(&format!("[{}] ", node_id));
    }
    out.push_str(stage.name());
    out.push(' ');
    out.push_str(&super::value::format_slots(&stage.debug_slots()));
    for child in stage.children() {
        write_debug(child, depth + 1, out);
    }
}

/// Panics unless every slot in `slots` resolves against `stage`
pub(crate) fn assert_slots_resolve(owner: &str, stage: &dyn SbeStage, slots: &[SlotId]) {
    for slot in slots {
        assert!(
            stage.get_accessor(*slot).is_some(),
            "{}: slot s{} is not produced by its input",
            owner,
            slot
        );
    }
}
