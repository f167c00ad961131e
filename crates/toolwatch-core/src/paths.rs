use crate::family::ToolFamily;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const BASE_DIR_NAME: &str = ".toolwatch";
pub const LOGS_DIR: &str = "logs";
pub const CONFIG_FILE: &str = "config.yaml";

pub const ANALYSIS_FILE: &str = "ecosystem-analysis.json";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn logs_dir(base: &Path) -> PathBuf {
    base.join(LOGS_DIR)
}

/// Append-only execution log for a family (JSON Lines, one record per line).
pub fn log_path(base: &Path, family: ToolFamily) -> PathBuf {
    logs_dir(base).join(format!("{}-executions.log", family.as_str()))
}

/// Derived statistics document for a family, rewritten in full on update.
pub fn stats_path(base: &Path, family: ToolFamily) -> PathBuf {
    logs_dir(base).join(format!("{}-stats.json", family.as_str()))
}

pub fn analysis_path(base: &Path) -> PathBuf {
    logs_dir(base).join(ANALYSIS_FILE)
}

pub fn recommendations_path(base: &Path) -> PathBuf {
    logs_dir(base).join(RECOMMENDATIONS_FILE)
}

pub fn config_path(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Tool name validation
// ---------------------------------------------------------------------------

static TOOL_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn tool_name_re() -> &'static Regex {
    // Shell command words and mcp__server__operation identifiers; no
    // whitespace, no shell metacharacters.
    TOOL_NAME_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9_.+-]*$").unwrap())
}

pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= 128 && tool_name_re().is_match(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
