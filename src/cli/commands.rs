//! CLI command implementations
//!
//! Each command loads its input fully, builds a stage tree, drives it to
//! exhaustion and writes the results. Commands write to the given writer so
//! they can run against a buffer in tests.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ExecConfig;
use crate::document::{get_path, into_document, Document};
use crate::exec::{
    BoxedPlanStage, EnsureSortedStage, LimitStage, PlanExecutor, PlanStageStats, QueuedDataStage,
    ReturnKeyStage, SkipStage, SortKeyGeneratorStage, SortPattern,
};
use crate::observability::{log_event, Event, Logger, MetricsRegistry, ObservationScope};
use crate::sbe::{debug_print, PlanState, SbeStage, SlotId, UniqueStage, ValuesStage};
use crate::working_set::WorkingSet;

use super::args::{Cli, Command, RunArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_documents, write_documents, write_json};

/// Parse arguments and run the selected command against stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_command(cli.command, cli.config.as_deref(), &mut out)
}

/// Load a config file and apply its process-wide settings
pub fn apply_config(path: &Path) -> CliResult<ExecConfig> {
    let config = ExecConfig::load(path)?;
    Logger::set_min_severity(config.min_severity()?);
    Ok(config)
}

/// Run one command. `config`, when given, is applied first.
pub fn run_command(command: Command, config: Option<&Path>, out: &mut dyn Write) -> CliResult<()> {
    if !matches!(command, Command::CheckConfig) {
        if let Some(path) = config {
            apply_config(path)?;
        }
    }

    match command {
        Command::Run(args) => {
            let docs = read_documents(&args.input)?;
            run_plan(&args, docs, out)
        }
        Command::Unique {
            input,
            keys,
            explain,
        } => {
            let docs = read_documents(&input)?;
            unique(docs, &keys, explain, out)
        }
        Command::CheckConfig => {
            let path = config
                .ok_or_else(|| CliError::invalid_arguments("check-config requires --config"))?;
            check_config(path, out)
        }
    }
}

/// Build the classic stage tree for `args` over `docs`
///
/// Order from the leaf up: queued data, sort key generation, sort order
/// enforcement, skip, limit, return key.
pub fn build_plan(args: &RunArgs, docs: Vec<Document>) -> CliResult<PlanExecutor> {
    let pattern = args
        .sort
        .as_deref()
        .map(SortPattern::parse)
        .transpose()
        .map_err(|status| CliError::invalid_arguments(status.reason()))?;

    if args.ensure_sorted && pattern.is_none() {
        return Err(CliError::invalid_arguments("--ensure-sorted requires --sort"));
    }

    let mut ws = WorkingSet::new();
    let mut queued = QueuedDataStage::new();
    for doc in docs {
        queued.push_back_document(&mut ws, doc);
    }

    let mut root: BoxedPlanStage = Box::new(queued);
    if let Some(pattern) = pattern {
        root = Box::new(SortKeyGeneratorStage::new(pattern.clone(), root));
        if args.ensure_sorted {
            root = Box::new(EnsureSortedStage::new(&pattern, root));
        }
    }
    if let Some(skip) = args.skip {
        root = Box::new(SkipStage::new(skip, root));
    }
    if let Some(limit) = args.limit {
        root = Box::new(LimitStage::new(limit, root));
    }
    if !args.return_key.is_empty() {
        root = Box::new(ReturnKeyStage::new(args.return_key.clone(), root));
    }

    Ok(PlanExecutor::new(ws, root))
}

/// Execute a classic plan and write its results
pub fn run_plan(args: &RunArgs, docs: Vec<Document>, out: &mut dyn Write) -> CliResult<()> {
    let input = args.input.display().to_string();
    let scope = ObservationScope::with_fields("RUN_COMMAND", &[("input", &input)]);
    let metrics = Arc::new(MetricsRegistry::new());

    let mut executor = match build_plan(args, docs) {
        Ok(executor) => executor.with_metrics(Arc::clone(&metrics)),
        Err(e) => {
            scope.fail(e.message());
            return Err(e);
        }
    };

    let results = match executor.collect_all() {
        Ok(results) => results,
        Err(status) => {
            scope.fail(status.reason());
            return Err(status.into());
        }
    };

    write_documents(out, &results)?;
    if args.explain {
        write_explain(out, &executor.explain())?;
    }

    scope.complete_with_fields(&[("returned", &results.len().to_string())]);
    Logger::trace("METRICS_SNAPSHOT", &[("metrics", &metrics.to_json())]);
    Ok(())
}

fn write_explain(out: &mut dyn Write, stats: &PlanStageStats) -> CliResult<()> {
    writeln!(out, "{}", stats.to_json_pretty())?;
    out.flush()?;
    log_event(Event::ExplainComplete);
    Ok(())
}

/// Deduplicate `docs` on `keys` with the slot-based unique stage
///
/// Key `i` is bound to slot `i + 1`; the whole document rides along in the
/// slot after the last key.
pub fn unique(
    docs: Vec<Document>,
    keys: &[String],
    explain: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    if keys.is_empty() {
        return Err(CliError::invalid_arguments("at least one --key is required"));
    }

    let key_slots: Vec<SlotId> = (1..=keys.len() as SlotId).collect();
    let doc_slot = keys.len() as SlotId + 1;
    let mut slots = key_slots.clone();
    slots.push(doc_slot);

    let rows = docs
        .into_iter()
        .map(|doc| {
            let mut row: Vec<Value> = keys
                .iter()
                .map(|key| get_path(&doc, key).cloned().unwrap_or(Value::Null))
                .collect();
            row.push(Value::Object(doc));
            row
        })
        .collect();

    let values = ValuesStage::new(slots, rows, 1);
    let mut stage = UniqueStage::new(Box::new(values), key_slots, 2);

    let plan = debug_print(&stage);
    let scope = ObservationScope::with_fields("UNIQUE_COMMAND", &[("plan", &plan)]);
    stage.prepare();
    stage.open(false);

    let mut results = Vec::new();
    while stage.get_next() == PlanState::Advanced {
        let doc = stage
            .get_accessor(doc_slot)
            .map(|accessor| accessor.copy_value())
            .and_then(into_document)
            .unwrap_or_default();
        results.push(doc);
    }
    stage.close();

    write_documents(out, &results)?;
    if explain {
        write_explain(out, &stage.get_stats())?;
    }
    scope.complete_with_fields(&[
        ("returned", &results.len().to_string()),
        ("dupes_dropped", &stage.dupes_dropped().to_string()),
    ]);
    Ok(())
}

/// Validate a config file and echo it with defaults filled in
pub fn check_config(path: &Path, out: &mut dyn Write) -> CliResult<()> {
    let config = ExecConfig::load(path)?;
    write_json(out, &serde_json::to_value(&config)?)
}
