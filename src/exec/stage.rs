//! The pull protocol every execution stage implements
//!
//! A caller repeatedly asks the root stage for one unit of work. Each call
//! returns a `StageState`:
//!
//! - `Advanced(id)` - exactly one new result is available at `id`
//! - `NeedTime` - no result yet, call again
//! - `NeedYield` - release and reacquire external resources, then call again
//! - `Failure(id)` - unrecoverable; `id` carries a `Status`
//!
//! End of stream is not a state: it is queried with `is_eof()`, which must
//! not affect iteration.
//!
//! # Protocol rules
//!
//! - A stage owns its children exclusively (strict tree)
//! - A stage that forwards a child's `Failure` forwards the handle unchanged
//!   and is never worked again
//! - Working a stage after `Failure`, or once `is_eof()` holds, panics

use std::fmt;

use crate::working_set::{WorkingSet, WorkingSetId};

use super::stats::{CommonStats, PlanStageStats, SpecificStats};

/// Result of one unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Advanced(WorkingSetId),
    NeedTime,
    NeedYield,
    Failure(WorkingSetId),
}

impl StageState {
    pub fn is_advanced(&self) -> bool {
        matches!(self, StageState::Advanced(_))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StageState::Advanced(_) => "ADVANCED",
            StageState::NeedTime => "NEED_TIME",
            StageState::NeedYield => "NEED_YIELD",
            StageState::Failure(_) => "FAILURE",
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of classic stage kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageType {
    QueuedData,
    SortKeyGenerator,
    EnsureSorted,
    ReturnKey,
    Limit,
    Skip,
}

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageType::QueuedData => "QUEUED_DATA",
            StageType::SortKeyGenerator => "SORT_KEY_GENERATOR",
            StageType::EnsureSorted => "ENSURE_SORTED",
            StageType::ReturnKey => "RETURN_KEY",
            StageType::Limit => "LIMIT",
            StageType::Skip => "SKIP",
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boxed stage with exclusive ownership
pub type BoxedPlanStage = Box<dyn PlanStage>;

/// A node of the execution tree
pub trait PlanStage {
    fn stage_type(&self) -> StageType;

    /// Stage-specific unit of work. Called through `work`.
    fn do_work(&mut self, ws: &mut WorkingSet) -> StageState;

    /// Whether no more results will ever be produced
    fn is_eof(&self) -> bool;

    fn common_stats(&self) -> &CommonStats;

    fn common_stats_mut(&mut self) -> &mut CommonStats;

    fn specific_stats(&self) -> SpecificStats {
        SpecificStats::None
    }

    fn children(&self) -> Vec<&dyn PlanStage> {
        Vec::new()
    }

    /// Perform one unit of work, maintaining common stats
    fn work(&mut self, ws: &mut WorkingSet) -> StageState {
        assert!(
            !self.common_stats().failed,
            "{} worked after reporting FAILURE",
            self.stage_type()
        );
        assert!(!self.is_eof(), "{} worked after reaching EOF", self.stage_type());

        let state = self.do_work(ws);
        self.common_stats_mut().record(&state);
        state
    }

    /// Summarize this stage and its children
    fn get_stats(&self) -> PlanStageStats {
        let mut common = self.common_stats().clone();
        common.is_eof = self.is_eof();
        PlanStageStats {
            common,
            specific: self.specific_stats(),
            children: self.children().iter().map(|c| c.get_stats()).collect(),
        }
    }
}
