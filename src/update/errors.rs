//! Update log entry errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateEntryError {
    #[error("Update log entry has no content")]
    NotSet,

    #[error("Unrecognized update entry version: {0}")]
    UnknownVersion(String),

    #[error("Update entry version {0} cannot be represented as a log entry")]
    UnsupportedVersion(i64),

    #[error("Malformed update entry: {0}")]
    Malformed(String),
}
