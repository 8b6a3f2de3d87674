//! Structured error detail for execution failures
//!
//! A `Status` is what a `FAILURE` result carries in its working set member,
//! and what the cooperative wait helper surfaces when an operation is
//! interrupted.
//!
//! Error codes:
//! - AERO_INTERNAL_ERROR (ERROR)
//! - AERO_INTERRUPTED (ERROR)
//! - AERO_BAD_VALUE (ERROR)
//! - AERO_NO_SUCH_KEY (ERROR)
//! - AERO_FAILED_TO_PARSE (ERROR)

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity levels for execution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation failed but system is healthy
    Error,
    /// System must halt immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Error codes carried by a `Status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Misconfigured plan or unexpected internal state
    InternalError,
    /// Operation was killed while waiting
    Interrupted,
    /// Invalid input value
    BadValue,
    /// Named entity does not exist
    NoSuchKey,
    /// Input could not be parsed
    FailedToParse,
}

impl ErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::InternalError => "AERO_INTERNAL_ERROR",
            ErrorCode::Interrupted => "AERO_INTERRUPTED",
            ErrorCode::BadValue => "AERO_BAD_VALUE",
            ErrorCode::NoSuchKey => "AERO_NO_SUCH_KEY",
            ErrorCode::FailedToParse => "AERO_FAILED_TO_PARSE",
        }
    }

    /// Returns the numeric code used on the wire
    pub fn number(&self) -> i32 {
        match self {
            ErrorCode::InternalError => 1,
            ErrorCode::BadValue => 2,
            ErrorCode::NoSuchKey => 4,
            ErrorCode::FailedToParse => 9,
            ErrorCode::Interrupted => 11601,
        }
    }

    /// Returns the severity level for this code
    pub fn severity(&self) -> Severity {
        Severity::Error
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Error code plus human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("[{}] {}: {}", .code.severity(), .code, .reason)]
pub struct Status {
    code: ErrorCode,
    reason: String,
}

impl Status {
    /// Create a status with an explicit code
    pub fn new(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Create an internal error status
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, reason)
    }

    /// Create an interruption status
    pub fn interrupted(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::Interrupted, reason)
    }

    /// Create a bad value status
    pub fn bad_value(reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadValue, reason)
    }

    /// Returns the error code
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the reason
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns whether this status reports an interruption
    pub fn is_interrupted(&self) -> bool {
        self.code == ErrorCode::Interrupted
    }
}
