//! In-memory cluster cursor manager
//!
//! Cursors are identified by random non-zero 64-bit ids. A cursor is
//! pinned while checked out by an operation and is never killed or reaped
//! while pinned. Killing marks a cursor kill-pending (a zombie); zombies
//! are destroyed by `reap_zombie_cursors`, or on check-in if they were
//! pinned when killed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::status::{ErrorCode, Status};

use super::registry::CursorRegistry;

pub type CursorId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorLifetime {
    /// Subject to inactivity timeout
    Mortal,
    /// Never timed out; only killed explicitly
    Immortal,
}

#[derive(Debug, Clone)]
struct CursorEntry {
    namespace: String,
    lifetime: CursorLifetime,
    last_active: DateTime<Utc>,
    pinned: bool,
    kill_pending: bool,
}

/// Read-only view of one cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorInfo {
    pub id: CursorId,
    pub namespace: String,
    pub lifetime: CursorLifetime,
    pub last_active: DateTime<Utc>,
    pub pinned: bool,
    pub kill_pending: bool,
}

#[derive(Debug)]
pub struct ClusterCursorManager {
    cursors: Mutex<HashMap<CursorId, CursorEntry>>,
    rng: Mutex<StdRng>,
    cursors_timed_out: AtomicU64,
}

impl Default for ClusterCursorManager {
    fn default() -> Self {
        Self::new()
    }
}

fn cursor_not_found(id: CursorId) -> Status {
    Status::new(ErrorCode::NoSuchKey, format!("cursor id {} not found", id))
}

impl ClusterCursorManager {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic cursor ids, for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            cursors: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
            cursors_timed_out: AtomicU64::new(0),
        }
    }

    // A panic mid-update leaves at worst one stale flag, so poisoned
    // locks are recovered.
    fn cursors(&self) -> MutexGuard<'_, HashMap<CursorId, CursorEntry>> {
        self.cursors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new cursor, initially unpinned and active at `now`
    pub fn register_cursor(
        &self,
        namespace: impl Into<String>,
        lifetime: CursorLifetime,
        now: DateTime<Utc>,
    ) -> CursorId {
        let mut cursors = self.cursors();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let candidate: CursorId = rng.gen();
            if candidate != 0 && !cursors.contains_key(&candidate) {
                break candidate;
            }
        };
        cursors.insert(
            id,
            CursorEntry {
                namespace: namespace.into(),
                lifetime,
                last_active: now,
                pinned: false,
                kill_pending: false,
            },
        );
        id
    }

    /// Pin a cursor for use by an operation
    pub fn check_out(&self, id: CursorId) -> Result<(), Status> {
        let mut cursors = self.cursors();
        let entry = cursors.get_mut(&id).ok_or_else(|| cursor_not_found(id))?;
        if entry.kill_pending {
            return Err(Status::new(
                ErrorCode::Interrupted,
                format!("cursor id {} was killed", id),
            ));
        }
        if entry.pinned {
            return Err(Status::bad_value(format!("cursor id {} is already in use", id)));
        }
        entry.pinned = true;
        Ok(())
    }

    /// Unpin a cursor and record activity at `now`. A cursor killed while
    /// pinned is destroyed here; `exhausted` destroys it as well.
    pub fn check_in(&self, id: CursorId, now: DateTime<Utc>, exhausted: bool) -> Result<(), Status> {
        let mut cursors = self.cursors();
        let entry = cursors.get_mut(&id).ok_or_else(|| cursor_not_found(id))?;
        assert!(entry.pinned, "check_in of cursor {} that is not checked out", id);
        entry.pinned = false;
        entry.last_active = now;
        if exhausted || entry.kill_pending {
            cursors.remove(&id);
        }
        Ok(())
    }

    /// Mark a cursor kill-pending
    pub fn kill_cursor(&self, id: CursorId) -> Result<(), Status> {
        let mut cursors = self.cursors();
        let entry = cursors.get_mut(&id).ok_or_else(|| cursor_not_found(id))?;
        entry.kill_pending = true;
        Ok(())
    }

    pub fn get(&self, id: CursorId) -> Option<CursorInfo> {
        self.cursors().get(&id).map(|e| CursorInfo {
            id,
            namespace: e.namespace.clone(),
            lifetime: e.lifetime,
            last_active: e.last_active,
            pinned: e.pinned,
            kill_pending: e.kill_pending,
        })
    }

    /// Number of cursors, including zombies not yet reaped
    pub fn len(&self) -> usize {
        self.cursors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors().is_empty()
    }
}

impl CursorRegistry for ClusterCursorManager {
    fn kill_mortal_cursors_inactive_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut killed = 0;
        for entry in self.cursors().values_mut() {
            if entry.lifetime == CursorLifetime::Mortal
                && !entry.pinned
                && !entry.kill_pending
                && entry.last_active < cutoff
            {
                entry.kill_pending = true;
                killed += 1;
            }
        }
        killed
    }

    fn reap_zombie_cursors(&self) -> usize {
        let mut cursors = self.cursors();
        let before = cursors.len();
        cursors.retain(|_, e| !(e.kill_pending && !e.pinned));
        before - cursors.len()
    }

    fn increment_cursors_timed_out(&self, n: usize) {
        self.cursors_timed_out.fetch_add(n as u64, Ordering::Relaxed);
    }

    fn cursors_timed_out(&self) -> u64 {
        self.cursors_timed_out.load(Ordering::Relaxed)
    }
}
