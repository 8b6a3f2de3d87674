//! Failpoint errors

use thiserror::Error;

pub type FailPointResult<T> = Result<T, FailPointError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailPointError {
    #[error("No failpoint named {0}")]
    UnknownFailPoint(String),

    #[error("Failpoint already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Invalid failpoint mode: {0}")]
    InvalidMode(String),

    #[error("Invalid configureFailPoint command: {0}")]
    InvalidCommand(String),
}
