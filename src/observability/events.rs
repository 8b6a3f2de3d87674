//! Lifecycle events of the execution engine
//!
//! Events are explicit and typed. Each maps to one stable log event name.

use std::fmt;

/// Observable events in aeroexec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,
    ConfigRejected,

    // Plan execution
    /// Executor returned a failure status to its caller (ERROR)
    PlanExecutionFailed,
    /// Return key stage could not build its output (WARN)
    ReturnKeyFailed,
    ExplainComplete,

    // Failpoints
    FailPointConfigured,
    FailPointWaitBegin,
    FailPointWaitEnd,
    /// Wait abandoned because the operation was killed (WARN)
    FailPointWaitInterrupted,

    // Operations
    OperationKilled,

    // Cursor reaper
    CursorReaperStart,
    CursorReaperPass,
    CursorReaperStop,
    /// Reaper thread could not be spawned (FATAL)
    CursorReaperSpawnFailed,

    ShutdownRequested,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigRejected => "CONFIG_REJECTED",

            Event::PlanExecutionFailed => "PLAN_EXECUTION_FAILED",
            Event::ReturnKeyFailed => "RETURN_KEY_FAILED",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",

            Event::FailPointConfigured => "FAIL_POINT_CONFIGURED",
            Event::FailPointWaitBegin => "FAIL_POINT_WAIT_BEGIN",
            Event::FailPointWaitEnd => "FAIL_POINT_WAIT_END",
            Event::FailPointWaitInterrupted => "FAIL_POINT_WAIT_INTERRUPTED",

            Event::OperationKilled => "OPERATION_KILLED",

            Event::CursorReaperStart => "CURSOR_REAPER_START",
            Event::CursorReaperPass => "CURSOR_REAPER_PASS",
            Event::CursorReaperStop => "CURSOR_REAPER_STOP",
            Event::CursorReaperSpawnFailed => "CURSOR_REAPER_SPAWN_FAILED",

            Event::ShutdownRequested => "SHUTDOWN_REQUESTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CursorReaperSpawnFailed)
    }

    /// Returns true if this event reports a rejected input or a failed operation
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::ConfigRejected | Event::PlanExecutionFailed)
    }

    /// Returns true if this event reports a recoverable problem
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::ReturnKeyFailed | Event::FailPointWaitInterrupted)
    }

    /// Events emitted on every loop iteration are logged at TRACE
    pub fn is_periodic(&self) -> bool {
        matches!(self, Event::CursorReaperPass)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_upper_snake_case() {
        let events = [
            Event::ConfigLoaded,
            Event::ConfigRejected,
            Event::PlanExecutionFailed,
            Event::ReturnKeyFailed,
            Event::ExplainComplete,
            Event::FailPointConfigured,
            Event::FailPointWaitBegin,
            Event::FailPointWaitEnd,
            Event::FailPointWaitInterrupted,
            Event::OperationKilled,
            Event::CursorReaperStart,
            Event::CursorReaperPass,
            Event::CursorReaperStop,
            Event::CursorReaperSpawnFailed,
            Event::ShutdownRequested,
        ];
        for event in events {
            assert!(event.as_str().chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_and_periodic() {
        assert!(Event::CursorReaperSpawnFailed.is_fatal());
        assert!(!Event::CursorReaperStop.is_fatal());
        assert!(Event::CursorReaperPass.is_periodic());
        assert!(!Event::OperationKilled.is_periodic());
        assert!(Event::PlanExecutionFailed.is_failure());
        assert!(!Event::ExplainComplete.is_failure());
        assert!(Event::ReturnKeyFailed.is_warning());
        assert!(Event::FailPointWaitInterrupted.is_warning());
        assert!(!Event::FailPointWaitEnd.is_warning());
    }
}
