//! Process-wide shutdown flag
//!
//! Created once at startup and handed by clone to every background loop.
//! Loops poll it; nothing is interrupted asynchronously.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::observability::{log_event, Event};

#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this flag to stop. Idempotent.
    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            log_event(Event::ShutdownRequested);
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
