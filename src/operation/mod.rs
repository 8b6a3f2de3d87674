//! Running operations
//!
//! An [`OperationContext`] is shared (via `Arc`) between the thread running
//! the operation and anyone who may kill it or read its progress message.

mod context;
mod registry;

pub use context::{OpId, OperationContext};
pub use registry::{convert_op_id, OperationRegistry};
