//! JSON I/O handling for the CLI
//!
//! - Input: a JSON array of objects, or one JSON object per line
//! - Output: one JSON object per line
//! - UTF-8 only

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::document::{into_document, Document};

use super::errors::{CliError, CliResult};

/// Read a document file
pub fn read_documents(path: &Path) -> CliResult<Vec<Document>> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::io_error(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_documents(&content)
}

/// Parse a JSON array of objects or JSON lines
pub fn parse_documents(content: &str) -> CliResult<Vec<Document>> {
    if content.trim_start().starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(content)?;
        return values
            .into_iter()
            .enumerate()
            .map(|(idx, v)| to_document(v, idx + 1))
            .collect();
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| to_document(serde_json::from_str(line)?, idx + 1))
        .collect()
}

fn to_document(value: Value, position: usize) -> CliResult<Document> {
    into_document(value)
        .ok_or_else(|| CliError::io_error(format!("Entry {} is not a JSON object", position)))
}

/// Write one document per line
pub fn write_documents(out: &mut dyn Write, docs: &[Document]) -> CliResult<()> {
    for doc in docs {
        serde_json::to_writer(&mut *out, doc)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Write a pretty-printed JSON value
pub fn write_json(out: &mut dyn Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
