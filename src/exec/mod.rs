//! Classic pull-based execution stages
//!
//! A plan is a tree of [`PlanStage`]s sharing one [`WorkingSet`]. The
//! consumer repeatedly calls `work()` on the root; each call returns one
//! [`StageState`]:
//!
//! - `Advanced(id)`: a result is ready in member `id`, now owned by the caller
//! - `NeedTime`: no result this call, call again
//! - `NeedYield`: the caller should release resources before calling again
//! - `Failure(id)`: member `id` holds the error `Status`
//!
//! End of stream is reported by `is_eof()`, never by a return value.
//!
//! [`WorkingSet`]: crate::working_set::WorkingSet

mod ensure_sorted;
mod executor;
mod limit;
mod queued_data;
mod return_key;
mod skip;
mod sort_key_generator;
mod sort_pattern;
mod stage;
mod stats;

pub use ensure_sorted::EnsureSortedStage;
pub use executor::{ExecResult, PlanExecutor, YieldHook};
pub use limit::LimitStage;
pub use queued_data::QueuedDataStage;
pub use return_key::ReturnKeyStage;
pub use skip::SkipStage;
pub use sort_key_generator::SortKeyGeneratorStage;
pub use sort_pattern::{SortComponent, SortDirection, SortKeyComparator, SortPattern};
pub use stage::{BoxedPlanStage, PlanStage, StageState, StageType};
pub use stats::{CommonStats, PlanStageStats, SpecificStats};
