//! Server-side cursors and the background reaper that times them out
//!
//! The reaper ([`CursorCleanupJob`]) only talks to a registry through
//! [`CursorRegistry`]; [`ClusterCursorManager`] is the in-memory
//! implementation.

mod cleanup_job;
mod knobs;
mod manager;
mod registry;

pub use cleanup_job::{inactivity_cutoff, CursorCleanupJob, ReaperPass, THREAD_NAME};
pub use knobs::{CursorKnobs, DEFAULT_CURSOR_TIMEOUT_MILLIS, DEFAULT_MONITOR_FREQUENCY_SECS};
pub use manager::{ClusterCursorManager, CursorId, CursorInfo, CursorLifetime};
pub use registry::CursorRegistry;
