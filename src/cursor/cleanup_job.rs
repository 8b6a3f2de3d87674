//! Background cursor reaper
//!
//! Each pass:
//! 1. Read the inactivity timeout `T`
//! 2. Cutoff = now - T, or now when T <= 0
//! 3. Kill mortal cursors inactive since the cutoff
//! 4. Reap zombies and add the count to the timed-out counter
//!
//! Between passes the thread idles for the monitor frequency. The shutdown
//! flag is checked before every pass and between short idle slices, so a
//! shutdown request is observed within one idle interval.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::observability::{log_event, log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::shutdown::ShutdownFlag;

use super::knobs::CursorKnobs;
use super::registry::CursorRegistry;

pub const THREAD_NAME: &str = "CursorCleanupJob";

/// Longest uninterrupted sleep between shutdown checks
const IDLE_SLICE: Duration = Duration::from_millis(50);

/// Outcome of one reaper pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaperPass {
    pub cutoff: DateTime<Utc>,
    pub killed_inactive: usize,
    pub zombies_reaped: usize,
}

/// Inactivity cutoff for a timeout in milliseconds
///
/// A timeout reaching past the earliest representable time yields that
/// earliest time, so no cursor is old enough to be killed.
pub fn inactivity_cutoff(now: DateTime<Utc>, timeout_millis: i64) -> DateTime<Utc> {
    if timeout_millis > 0 {
        now.checked_sub_signed(chrono::Duration::milliseconds(timeout_millis))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    } else {
        now
    }
}

pub struct CursorCleanupJob {
    registry: Arc<dyn CursorRegistry>,
    knobs: Arc<CursorKnobs>,
    shutdown: ShutdownFlag,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl CursorCleanupJob {
    pub fn new(
        registry: Arc<dyn CursorRegistry>,
        knobs: Arc<CursorKnobs>,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            registry,
            knobs,
            shutdown,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// One reaper pass as of `now`
    pub fn run_once(&self, now: DateTime<Utc>) -> ReaperPass {
        let cutoff = inactivity_cutoff(now, self.knobs.cursor_timeout_millis());
        let killed_inactive = self.registry.kill_mortal_cursors_inactive_since(cutoff);
        let zombies_reaped = self.registry.reap_zombie_cursors();
        self.registry.increment_cursors_timed_out(zombies_reaped);

        if let Some(metrics) = &self.metrics {
            metrics.record_reaper_pass(killed_inactive as u64, zombies_reaped as u64);
        }
        let fields = [
            ("killed_inactive", killed_inactive.to_string()),
            ("zombies_reaped", zombies_reaped.to_string()),
            ("cutoff", cutoff.to_rfc3339()),
        ];
        let fields: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        if killed_inactive + zombies_reaped > 0 {
            Logger::info(Event::CursorReaperPass.as_str(), &fields);
        } else {
            log_event_with_fields(Event::CursorReaperPass, &fields);
        }

        ReaperPass {
            cutoff,
            killed_inactive,
            zombies_reaped,
        }
    }

    /// Loop until shutdown is requested. Returns the number of passes run.
    pub fn run(&self) -> u64 {
        log_event(Event::CursorReaperStart);

        let mut passes = 0u64;
        while !self.shutdown.is_requested() {
            self.run_once(Utc::now());
            passes += 1;
            self.idle(self.knobs.monitor_frequency());
        }

        log_event_with_fields(Event::CursorReaperStop, &[("passes", &passes.to_string())]);
        passes
    }

    /// Sleep for `interval` in slices. An interval too large to schedule
    /// idles until shutdown.
    fn idle(&self, interval: Duration) {
        let deadline = Instant::now().checked_add(interval);
        loop {
            if self.shutdown.is_requested() {
                return;
            }
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return;
                    }
                    (deadline - now).min(IDLE_SLICE)
                }
                None => IDLE_SLICE,
            };
            thread::sleep(slice);
        }
    }

    /// Run the loop on a dedicated named thread
    pub fn spawn(self) -> io::Result<JoinHandle<u64>> {
        thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || self.run())
            .map_err(|e| {
                let error = e.to_string();
                log_event_with_fields(Event::CursorReaperSpawnFailed, &[("error", &error)]);
                e
            })
    }
}
