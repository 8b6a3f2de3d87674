//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::status::Status;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Input or output failure
    IoError,
    /// Arguments that cannot form a plan
    InvalidArguments,
    /// The plan reported a failure
    ExecutionFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "AERO_CLI_CONFIG_ERROR",
            Self::IoError => "AERO_CLI_IO_ERROR",
            Self::InvalidArguments => "AERO_CLI_INVALID_ARGUMENTS",
            Self::ExecutionFailed => "AERO_CLI_EXECUTION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug, Error)]
#[error("{}: {message}", code.code())]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidArguments, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<Status> for CliError {
    fn from(status: Status) -> Self {
        Self::new(CliErrorCode::ExecutionFailed, status.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
