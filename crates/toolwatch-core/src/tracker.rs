//! Per-invocation tracking pipeline.
//!
//! One call per tool execution: append to the family log, rebuild the
//! derived statistics document, alert on repeated failures, and kick off
//! the analyzer every Nth record. Tracking is best-effort telemetry: every
//! internal failure is downgraded to a warning so the tracked invocation's
//! exit status is never affected.

use crate::analysis;
use crate::config::Config;
use crate::family::ToolFamily;
use crate::paths;
use crate::record::{self, ExecutionRecord};
use crate::recommend;
use crate::stats;
use std::path::Path;

/// Warn when at least this many of the recent records for a tool failed.
pub const REPEATED_FAILURE_THRESHOLD: usize = 3;

/// How many trailing log records the failure check inspects.
pub const ALERT_WINDOW: usize = 10;

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// The five values of the invocation contract.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub tool_name: String,
    pub success: bool,
    pub latency_ms: f64,
    pub error: Option<String>,
    pub session_id: String,
}

/// What the tracker did with an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracked {
    Recorded(ToolFamily),
    /// Tool name outside the tracked namespaces; nothing written.
    Ignored,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Track one tool execution. Infallible by design: errors from the
/// persistence layer are logged and swallowed.
pub fn track(config: &Config, invocation: &Invocation) -> Tracked {
    let Some(family) = ToolFamily::classify(&invocation.tool_name) else {
        return Tracked::Ignored;
    };

    let log_path = paths::log_path(&config.base_dir, family);
    let stats_path = paths::stats_path(&config.base_dir, family);

    let exec = ExecutionRecord::new(
        &invocation.tool_name,
        invocation.success,
        invocation.latency_ms,
        invocation.error.as_deref(),
        &invocation.session_id,
    );

    if let Err(e) = record::append(&log_path, &exec) {
        tracing::warn!("failed to append execution log: {e}");
    }

    if let Err(e) = stats::rebuild_from_log(config, &log_path, &stats_path) {
        tracing::warn!("failed to rebuild statistics: {e}");
    }

    if !invocation.success {
        if let Some(alert) = repeated_failure_alert(config, &log_path, &invocation.tool_name) {
            tracing::warn!(
                "{} has failed {} of its last {} tracked calls",
                alert.tool_name,
                alert.recent_failures,
                ALERT_WINDOW
            );
            if let Some(suggestion) = &alert.suggestion {
                tracing::warn!("suggestion: {suggestion}");
            }
        }
    }

    maybe_auto_analyze(config, &log_path);

    Tracked::Recorded(family)
}

// ---------------------------------------------------------------------------
// Repeated-failure alerting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FailureAlert {
    pub tool_name: String,
    pub recent_failures: usize,
    /// Looked up from the last-generated recommendations document.
    pub suggestion: Option<String>,
}

/// Inspect the trailing log window for the tool. Returns an alert when the
/// failure count reaches [`REPEATED_FAILURE_THRESHOLD`].
pub fn repeated_failure_alert(
    config: &Config,
    log_path: &Path,
    tool_name: &str,
) -> Option<FailureAlert> {
    let recent = record::tail(log_path, ALERT_WINDOW).ok()?;
    let recent_failures = recent
        .iter()
        .filter(|r| r.tool_name == tool_name && !r.outcome.is_success())
        .count();
    if recent_failures < REPEATED_FAILURE_THRESHOLD {
        return None;
    }

    let suggestion = recommend::load(&paths::recommendations_path(&config.base_dir))
        .and_then(|recs| recs.suggestion_for(tool_name).map(str::to_string));

    Some(FailureAlert {
        tool_name: tool_name.to_string(),
        recent_failures,
        suggestion,
    })
}

// ---------------------------------------------------------------------------
// Periodic analysis
// ---------------------------------------------------------------------------

fn maybe_auto_analyze(config: &Config, log_path: &Path) {
    if config.auto_analyze_every == 0 {
        return;
    }
    let line_count = match std::fs::read_to_string(log_path) {
        Ok(data) => data.lines().filter(|l| !l.trim().is_empty()).count() as u64,
        Err(_) => return,
    };
    if line_count > 0 && line_count % config.auto_analyze_every == 0 {
        if let Err(e) = analysis::run(config) {
            tracing::warn!("periodic analysis failed: {e}");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn invocation(tool: &str, success: bool, error: Option<&str>) -> Invocation {
        Invocation {
            tool_name: tool.to_string(),
            success,
            latency_ms: 120.0,
            error: error.map(str::to_string),
            session_id: "sess-1".to_string(),
        }
    }

    #[test]
    fn tracked_tool_lands_in_log_and_stats() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        let result = track(&config, &invocation("git", true, None));
        assert_eq!(result, Tracked::Recorded(ToolFamily::Shell));

        let log = paths::log_path(dir.path(), ToolFamily::Shell);
        assert_eq!(record::read_log(&log).unwrap().len(), 1);
        let stats = stats::load(&paths::stats_path(dir.path(), ToolFamily::Shell));
        assert_eq!(stats["git"].total_calls, 1);
    }

    #[test]
    fn mcp_tool_lands_in_its_own_family_files() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        track(&config, &invocation("mcp__time__now", true, None));

        assert!(paths::log_path(dir.path(), ToolFamily::Mcp).exists());
        assert!(!paths::log_path(dir.path(), ToolFamily::Shell).exists());
    }

    #[test]
    fn untracked_name_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        let result = track(&config, &invocation("Totally Not A Tool", true, None));
        assert_eq!(result, Tracked::Ignored);
        assert!(!paths::logs_dir(dir.path()).exists());
    }

    #[test]
    fn repeated_failures_raise_an_alert() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        for _ in 0..3 {
            track(&config, &invocation("git", false, Some("exit code 128")));
        }
        let log = paths::log_path(dir.path(), ToolFamily::Shell);
        let alert = repeated_failure_alert(&config, &log, "git").unwrap();
        assert_eq!(alert.recent_failures, 3);
        assert!(alert.suggestion.is_none());
    }

    #[test]
    fn two_failures_do_not_alert() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        track(&config, &invocation("git", false, Some("boom")));
        track(&config, &invocation("git", false, Some("boom")));
        let log = paths::log_path(dir.path(), ToolFamily::Shell);
        assert!(repeated_failure_alert(&config, &log, "git").is_none());
    }

    #[test]
    fn alert_includes_suggestion_from_recommendations() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        // Three failures of a critical-tier tool, then an analyzer run to
        // produce the recommendations document the alert reads back.
        for _ in 0..3 {
            track(&config, &invocation("jq", false, Some("parse error")));
        }
        analysis::run(&config).unwrap();

        let log = paths::log_path(dir.path(), ToolFamily::Shell);
        let alert = repeated_failure_alert(&config, &log, "jq").unwrap();
        assert_eq!(
            alert.suggestion.as_deref(),
            Some("Check jq installation and permissions")
        );
    }

    #[test]
    fn every_tenth_record_runs_the_analyzer() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        for _ in 0..9 {
            track(&config, &invocation("git", true, None));
        }
        assert!(!paths::analysis_path(dir.path()).exists());

        track(&config, &invocation("git", true, None));
        assert!(paths::analysis_path(dir.path()).exists());
        assert!(paths::recommendations_path(dir.path()).exists());
    }

    #[test]
    fn auto_analyze_disabled_with_zero_cadence() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::new(dir.path());
        config.auto_analyze_every = 0;

        for _ in 0..10 {
            track(&config, &invocation("git", true, None));
        }
        assert!(!paths::analysis_path(dir.path()).exists());
    }
}
