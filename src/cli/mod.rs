//! CLI module for aeroexec
//!
//! Provides command-line interface for:
//! - run: drive a classic stage tree over a document file
//! - unique: deduplicate documents with the slot-based unique stage
//! - check-config: validate a configuration file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, RunArgs};
pub use commands::{apply_config, build_plan, check_config, run, run_command, run_plan, unique};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_documents, read_documents, write_documents, write_json};
