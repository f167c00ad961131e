//! Execution log persistence.
//!
//! Every tracked invocation appends one JSON line to the family's
//! append-only log. The log is the sole source of truth: statistics are
//! rebuilt from it, so records are never mutated after the append.

use crate::error::Result;
use crate::io;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Error snippets in the log are capped at this many characters.
pub const ERROR_SNIPPET_MAX: usize = 100;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILURE")]
    Failure,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "SUCCESS",
            Outcome::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExecutionRecord
// ---------------------------------------------------------------------------

/// One tool invocation. Created by the caller, written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
    pub tool_name: String,
    pub outcome: Outcome,
    pub latency_ms: f64,
    /// Truncated to [`ERROR_SNIPPET_MAX`] characters at construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    pub fn new(
        tool_name: impl Into<String>,
        success: bool,
        latency_ms: f64,
        error: Option<&str>,
        session_id: impl Into<String>,
    ) -> Self {
        let outcome = if success {
            Outcome::Success
        } else {
            Outcome::Failure
        };
        let error = error
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| truncate_chars(e, ERROR_SNIPPET_MAX));
        Self {
            timestamp: Utc::now(),
            session_id: session_id.into(),
            tool_name: tool_name.into(),
            outcome,
            latency_ms,
            error,
        }
    }
}

/// Truncate on a character boundary, not a byte boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

// ---------------------------------------------------------------------------
// Log I/O
// ---------------------------------------------------------------------------

/// Append one record to the log, creating file and parents if absent.
pub fn append(log_path: &Path, record: &ExecutionRecord) -> Result<()> {
    let line = serde_json::to_string(record)?;
    io::append_line(log_path, &line)
}

/// Read every parseable record from the log, in append order. A missing
/// file reads as empty; unparseable lines (torn writes, foreign appenders)
/// are skipped rather than failing the whole read.
pub fn read_log(log_path: &Path) -> Result<Vec<ExecutionRecord>> {
    let data = match std::fs::read_to_string(log_path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(data
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}

/// The last `n` records of a log, oldest first.
pub fn tail(log_path: &Path, n: usize) -> Result<Vec<ExecutionRecord>> {
    let mut records = read_log(log_path)?;
    if records.len() > n {
        records.drain(..records.len() - n);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
