//! Slot-based execution
//!
//! Stages here follow the open/get_next/close protocol and exchange values
//! through numbered slots instead of working-set members. Rows are read
//! through [`SlotAccessor`]s; [`MaterializedRow`] snapshots selected slot
//! values into an owned hash/equality key.

mod merge_sort;
mod stage;
mod unique;
mod value;
mod values;

pub use merge_sort::MergeSortStage;
pub use stage::{debug_print, BoxedSbeStage, PlanNodeId, PlanState, SbeStage};
pub use unique::UniqueStage;
pub use value::{format_slots, MaterializedRow, OwnedValueAccessor, SlotAccessor, SlotId, SlotVector};
pub use values::ValuesStage;
