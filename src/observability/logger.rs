//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, then `severity`, then fields sorted by key
//! - Synchronous, no buffering
//! - Events below the process-wide minimum severity are discarded

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

use serde_json::{Map, Value};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-iteration detail (reaper passes, failpoint polls)
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable condition
    Fatal = 4,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Parse a level name as written in config files (`"info"`, `"WARN"`, ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TRACE" => Some(Severity::Trace),
            "INFO" => Some(Severity::Info),
            "WARN" => Some(Severity::Warn),
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Set the process-wide minimum severity
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        if severity >= Severity::Error {
            Self::log_to_writer(severity, event, fields, &mut io::stderr());
        } else {
            Self::log_to_writer(severity, event, fields, &mut io::stdout());
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let mut line = render(severity, event, fields);
        line.push('\n');
        // Logging never fails the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

/// Render one log record without the trailing newline
fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut record = Map::new();
    record.insert("event".into(), Value::from(event));
    record.insert("severity".into(), Value::from(severity.as_str()));

    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    for (key, value) in sorted {
        if key.eq_ignore_ascii_case("event") || key.eq_ignore_ascii_case("severity") {
            continue;
        }
        record.insert((*key).to_string(), Value::from(*value));
    }

    Value::Object(record).to_string()
}

#[cfg(test)]
pub(crate) fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(Severity::parse("warn"), Some(Severity::Warn));
        assert_eq!(Severity::parse("TRACE"), Some(Severity::Trace));
        assert_eq!(Severity::parse("verbose"), None);
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(Severity::Info, "PLAN_EXECUTION_BEGIN", &[("stages", "3")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "PLAN_EXECUTION_BEGIN");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["stages"], "3");
    }

    #[test]
    fn test_event_first_then_sorted_fields() {
        let a = capture_log(Severity::Info, "T", &[("zebra", "1"), ("apple", "2")]);
        let b = capture_log(Severity::Info, "T", &[("apple", "2"), ("zebra", "1")]);
        assert_eq!(a, b);
        assert!(a.find("\"event\"").unwrap() < a.find("\"severity\"").unwrap());
        assert!(a.find("apple").unwrap() < a.find("zebra").unwrap());
    }

    #[test]
    fn test_reserved_field_names_cannot_override() {
        let output = capture_log(Severity::Warn, "REAL", &[("event", "FAKE")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "REAL");
    }

    #[test]
    fn test_escapes_and_single_line() {
        let output = capture_log(Severity::Info, "T", &[("msg", "hello \"world\"\nline2")]);
        assert_eq!(output.matches('\n').count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["msg"], "hello \"world\"\nline2");
    }
}
