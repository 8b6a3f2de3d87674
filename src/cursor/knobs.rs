//! Runtime-tunable cursor reaper settings
//!
//! Re-read by the reaper on every iteration, so changes take effect on the
//! next pass without a restart.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

pub const DEFAULT_CURSOR_TIMEOUT_MILLIS: i64 = 10 * 60 * 1000;
pub const DEFAULT_MONITOR_FREQUENCY_SECS: u64 = 4;

#[derive(Debug)]
pub struct CursorKnobs {
    cursor_timeout_millis: AtomicI64,
    monitor_frequency_secs: AtomicU64,
}

impl Default for CursorKnobs {
    fn default() -> Self {
        Self::new(DEFAULT_CURSOR_TIMEOUT_MILLIS, DEFAULT_MONITOR_FREQUENCY_SECS)
    }
}

impl CursorKnobs {
    pub fn new(cursor_timeout_millis: i64, monitor_frequency_secs: u64) -> Self {
        Self {
            cursor_timeout_millis: AtomicI64::new(cursor_timeout_millis),
            monitor_frequency_secs: AtomicU64::new(monitor_frequency_secs),
        }
    }

    /// Inactivity timeout. Non-positive means cursors are eligible at once.
    pub fn cursor_timeout_millis(&self) -> i64 {
        self.cursor_timeout_millis.load(Ordering::Relaxed)
    }

    pub fn set_cursor_timeout_millis(&self, millis: i64) {
        self.cursor_timeout_millis.store(millis, Ordering::Relaxed);
    }

    pub fn monitor_frequency(&self) -> Duration {
        Duration::from_secs(self.monitor_frequency_secs.load(Ordering::Relaxed))
    }

    pub fn set_monitor_frequency_secs(&self, secs: u64) {
        self.monitor_frequency_secs.store(secs, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_updates() {
        let knobs = CursorKnobs::default();
        assert_eq!(knobs.cursor_timeout_millis(), 600_000);
        assert_eq!(knobs.monitor_frequency(), Duration::from_secs(4));

        knobs.set_cursor_timeout_millis(-1);
        knobs.set_monitor_frequency_secs(1);
        assert_eq!(knobs.cursor_timeout_millis(), -1);
        assert_eq!(knobs.monitor_frequency(), Duration::from_secs(1));
    }
}
