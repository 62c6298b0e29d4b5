//! `tree-path` — command-line access to the path engine.
//!
//! Provides the logic behind the binary entry point:
//! - `tree-path get <path>`           print the value(s) at a path
//! - `tree-path set <path> <json>`    print the document with a value written
//! - `tree-path delete <path>`        print the document with node(s) removed
//!
//! The document is read from stdin by the binary and passed in as a string.

use serde_json::Value;

use crate::{try_delete_value, try_get_value, try_set_value, ParseError};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CliError {
    Json(serde_json::Error),
    Path(ParseError),
    Usage(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Json(e)     => write!(f, "{e}"),
            CliError::Path(e)     => write!(f, "{e}"),
            CliError::Usage(e)    => write!(f, "{e}"),
            CliError::NotFound(p) => write!(f, "NOT_FOUND: {p}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self { CliError::Json(e) }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self { CliError::Path(e) }
}

pub const USAGE: &str = "Usage: tree-path get <path> | set <path> <json> | delete <path>";

// ── commands ──────────────────────────────────────────────────────────────

/// Look up `path` in a document. One match prints the bare value, several
/// print a JSON array of values.
pub fn lookup(doc_json: &str, path: &str) -> Result<String, CliError> {
    let doc: Value = serde_json::from_str(doc_json)?;
    let result = try_get_value(&doc, path)?;
    match result.to_value() {
        Some(value) => Ok(serde_json::to_string_pretty(&value)?),
        None => Err(CliError::NotFound(path.to_string())),
    }
}

/// Write the JSON-encoded `value_json` at `path` and return the document.
pub fn write(doc_json: &str, path: &str, value_json: &str) -> Result<String, CliError> {
    let mut doc: Value = serde_json::from_str(doc_json)?;
    let value: Value = serde_json::from_str(value_json)?;
    if !try_set_value(&mut doc, path, value)? {
        return Err(CliError::NotFound(path.to_string()));
    }
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Remove the node(s) at `path` and return the document.
pub fn remove(doc_json: &str, path: &str) -> Result<String, CliError> {
    let mut doc: Value = serde_json::from_str(doc_json)?;
    if !try_delete_value(&mut doc, path)? {
        return Err(CliError::NotFound(path.to_string()));
    }
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Dispatch on command-line arguments (program name excluded).
pub fn run(args: &[String], doc_json: &str) -> Result<String, CliError> {
    let usage = || CliError::Usage(USAGE.to_string());
    let command = args.first().ok_or_else(usage)?;
    let path = args.get(1).ok_or_else(usage)?;

    match (command.as_str(), args.len()) {
        ("get", 2) => lookup(doc_json, path),
        ("set", 3) => write(doc_json, path, &args[2]),
        ("delete", 2) => remove(doc_json, path),
        _ => Err(usage()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
