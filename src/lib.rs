//! aeroexec - pull-based query execution for AeroDB
//!
//! Classic stages share a [`working_set::WorkingSet`] arena and are driven
//! one unit of work at a time; slot-based stages exchange values through
//! numbered slots. Around them sit the operation context, failpoints with a
//! cooperative wait, the background cursor reaper and update log entries.

pub mod cli;
pub mod config;
pub mod cursor;
pub mod document;
pub mod exec;
pub mod failpoint;
pub mod observability;
pub mod operation;
pub mod sbe;
pub mod shutdown;
pub mod status;
pub mod update;
pub mod working_set;
