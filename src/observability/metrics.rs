//! Execution metrics
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Lock-free; Relaxed ordering is enough for counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    plans_executed: AtomicU64,
    plan_failures: AtomicU64,
    documents_returned: AtomicU64,
    yields: AtomicU64,
    fail_point_waits: AtomicU64,
    fail_point_wait_interrupts: AtomicU64,
    operations_killed: AtomicU64,
    reaper_passes: AtomicU64,
    cursors_killed_inactive: AtomicU64,
    zombie_cursors_reaped: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Plan execution

    pub fn increment_plans_executed(&self) {
        self.plans_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plan_failures(&self) {
        self.plan_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_returned(&self) {
        self.documents_returned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_yields(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
    }

    // Failpoints and operations

    pub fn increment_fail_point_waits(&self) {
        self.fail_point_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fail_point_wait_interrupts(&self) {
        self.fail_point_wait_interrupts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_operations_killed(&self) {
        self.operations_killed.fetch_add(1, Ordering::Relaxed);
    }

    // Cursor reaper

    /// Record one reaper pass
    pub fn record_reaper_pass(&self, killed_inactive: u64, zombies_reaped: u64) {
        self.reaper_passes.fetch_add(1, Ordering::Relaxed);
        self.cursors_killed_inactive
            .fetch_add(killed_inactive, Ordering::Relaxed);
        self.zombie_cursors_reaped
            .fetch_add(zombies_reaped, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_executed: self.plans_executed.load(Ordering::Relaxed),
            plan_failures: self.plan_failures.load(Ordering::Relaxed),
            documents_returned: self.documents_returned.load(Ordering::Relaxed),
            yields: self.yields.load(Ordering::Relaxed),
            fail_point_waits: self.fail_point_waits.load(Ordering::Relaxed),
            fail_point_wait_interrupts: self.fail_point_wait_interrupts.load(Ordering::Relaxed),
            operations_killed: self.operations_killed.load(Ordering::Relaxed),
            reaper_passes: self.reaper_passes.load(Ordering::Relaxed),
            cursors_killed_inactive: self.cursors_killed_inactive.load(Ordering::Relaxed),
            zombie_cursors_reaped: self.zombie_cursors_reaped.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_executed: u64,
    pub plan_failures: u64,
    pub documents_returned: u64,
    pub yields: u64,
    pub fail_point_waits: u64,
    pub fail_point_wait_interrupts: u64,
    pub operations_killed: u64,
    pub reaper_passes: u64,
    pub cursors_killed_inactive: u64,
    pub zombie_cursors_reaped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_registry_is_zero() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.plans_executed, 0);
        assert_eq!(snapshot.reaper_passes, 0);
    }

    #[test]
    fn test_reaper_pass_accumulates() {
        let registry = MetricsRegistry::new();
        registry.record_reaper_pass(3, 1);
        registry.record_reaper_pass(0, 2);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.reaper_passes, 2);
        assert_eq!(snapshot.cursors_killed_inactive, 3);
        assert_eq!(snapshot.zombie_cursors_reaped, 3);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.increment_documents_returned();
        registry.increment_fail_point_waits();

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["documents_returned"], 1);
        assert_eq!(parsed["fail_point_waits"], 1);
    }

    #[test]
    fn test_thread_safety() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_yields();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().yields, 800);
    }
}
