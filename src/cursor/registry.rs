//! What the cursor reaper needs from a cursor registry

use chrono::{DateTime, Utc};

/// Thread-safe registry of open cursors
///
/// Implementations provide their own locking; the reaper holds no lock of
/// its own across calls.
pub trait CursorRegistry: Send + Sync {
    /// Mark every mortal, unpinned cursor last used strictly before
    /// `cutoff` as kill-pending. Returns how many were marked.
    fn kill_mortal_cursors_inactive_since(&self, cutoff: DateTime<Utc>) -> usize;

    /// Destroy kill-pending cursors that are not pinned. Returns how many
    /// were destroyed.
    fn reap_zombie_cursors(&self) -> usize;

    fn increment_cursors_timed_out(&self, n: usize);

    /// Cumulative count of timed-out cursors
    fn cursors_timed_out(&self) -> u64;
}
