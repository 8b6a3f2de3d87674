//! Observability for aeroexec
//!
//! - Structured JSON logging
//! - Lock-free counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here changes execution results,
//! and a failing log write never fails the caller.
//!
//! ```ignore
//! use aeroexec::observability::{Logger, MetricsRegistry, ObservationScope};
//!
//! Logger::info("RUN_COMMAND_BEGIN", &[("root", "LIMIT")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_documents_returned();
//!
//! let scope = ObservationScope::new("RUN_COMMAND");
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Severity a lifecycle event is logged at
fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else if event.is_failure() {
        Severity::Error
    } else if event.is_warning() {
        Severity::Warn
    } else if event.is_periodic() {
        Severity::Trace
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
