//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroexec run --input <file> [--sort <pattern>] [--ensure-sorted] [--skip N] [--limit N]
//!   [--return-key FIELD]... [--explain]
//! - aeroexec unique --input <file> --key FIELD... [--explain]
//! - aeroexec check-config --config <path>
//!
//! `--config` is global: given to any command it sets the log level first.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroexec - run query execution stages over JSON documents
#[derive(Parser, Debug)]
#[command(name = "aeroexec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file applied before the command runs
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a classic stage tree over a document file
    Run(RunArgs),

    /// Deduplicate documents on key fields with the slot-based unique stage
    Unique {
        /// JSON array or JSON lines file of documents
        #[arg(long)]
        input: PathBuf,

        /// Key field (dotted paths allowed); repeat for compound keys
        #[arg(long = "key", required = true)]
        keys: Vec<String>,

        /// Write the stats tree after the results
        #[arg(long)]
        explain: bool,
    },

    /// Load and validate the file given with --config
    CheckConfig,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON array or JSON lines file of documents
    #[arg(long)]
    pub input: PathBuf,

    /// Sort key pattern, e.g. `a:asc,b:desc`
    #[arg(long)]
    pub sort: Option<String>,

    /// Drop results that arrive out of sort order
    #[arg(long, requires = "sort")]
    pub ensure_sorted: bool,

    #[arg(long)]
    pub skip: Option<u64>,

    #[arg(long)]
    pub limit: Option<u64>,

    /// Return keys instead of documents, binding the sort key to FIELD
    #[arg(long = "return-key", value_name = "FIELD")]
    pub return_key: Vec<String>,

    /// Write the stats tree after the results
    #[arg(long)]
    pub explain: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
