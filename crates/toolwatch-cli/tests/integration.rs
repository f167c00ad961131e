use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn toolwatch(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("toolwatch").unwrap();
    cmd.current_dir(dir.path()).env("TOOLWATCH_DIR", dir.path());
    cmd
}

fn record(dir: &TempDir, tool: &str, success: &str, latency: &str, error: &str) {
    toolwatch(dir)
        .args(["record", tool, success, latency, error, "sess-1"])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// toolwatch record
// ---------------------------------------------------------------------------

#[test]
fn record_creates_log_and_stats() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "42.5", "-");

    assert!(dir.path().join("logs/shell-executions.log").exists());
    assert!(dir.path().join("logs/shell-stats.json").exists());

    let stats = std::fs::read_to_string(dir.path().join("logs/shell-stats.json")).unwrap();
    assert!(stats.contains("\"git\""));
    assert!(stats.contains("\"total_calls\": 1"));
}

#[test]
fn record_routes_mcp_tools_to_their_own_family() {
    let dir = TempDir::new().unwrap();
    record(&dir, "mcp__github__get_issue", "true", "250", "-");

    assert!(dir.path().join("logs/mcp-executions.log").exists());
    assert!(!dir.path().join("logs/shell-executions.log").exists());
}

#[test]
fn record_ignores_untracked_tool_names() {
    let dir = TempDir::new().unwrap();
    // Uppercase names are outside the tracked namespaces: no-op, exit 0.
    toolwatch(&dir)
        .args(["record", "NotATool", "true", "10", "-", "sess-1"])
        .assert()
        .success();
    assert!(!dir.path().join("logs").exists());
}

#[test]
fn record_with_missing_arguments_fails_with_usage() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .args(["record", "git", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn record_rejects_malformed_success_flag() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .args(["record", "git", "yes", "10", "-", "sess-1"])
        .assert()
        .failure();
}

#[test]
fn record_rejects_negative_latency() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .args(["record", "git", "true", "-5", "-", "sess-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn record_failure_keeps_exit_zero() {
    let dir = TempDir::new().unwrap();
    // A failed tool execution is still a successful record call.
    record(&dir, "git", "false", "100", "exit code 128");
}

#[test]
fn repeated_failures_warn_on_stderr() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "false", "100", "exit code 128");
    record(&dir, "git", "false", "100", "exit code 128");

    toolwatch(&dir)
        .args(["record", "git", "false", "100", "exit code 128", "sess-1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("has failed 3 of its last"));
}

#[test]
fn every_tenth_record_writes_analysis_documents() {
    let dir = TempDir::new().unwrap();
    for _ in 0..9 {
        record(&dir, "git", "true", "40", "-");
    }
    assert!(!dir.path().join("logs/ecosystem-analysis.json").exists());

    record(&dir, "git", "true", "40", "-");
    assert!(dir.path().join("logs/ecosystem-analysis.json").exists());
    assert!(dir.path().join("logs/recommendations.json").exists());
}

// ---------------------------------------------------------------------------
// toolwatch analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_writes_both_documents_and_prints_summary() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");
    record(&dir, "mcp__time__now", "true", "15", "-");

    toolwatch(&dir)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 2 tools"))
        .stdout(predicate::str::contains("Health score: 100.0% (excellent)"));

    assert!(dir.path().join("logs/ecosystem-analysis.json").exists());
    assert!(dir.path().join("logs/recommendations.json").exists());
}

#[test]
fn analyze_on_empty_store_succeeds() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 0 tools"));
}

#[test]
fn analyze_reports_critical_tools() {
    let dir = TempDir::new().unwrap();
    record(&dir, "jq", "false", "10", "parse error");
    record(&dir, "jq", "false", "12", "parse error");

    toolwatch(&dir)
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 tools need immediate attention"))
        .stdout(predicate::str::contains("1 immediate actions recommended"));
}

#[test]
fn analyze_json_outputs_full_document() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");

    toolwatch(&dir)
        .args(["analyze", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ecosystem_health\""))
        .stdout(predicate::str::contains("\"reliability_tiers\""));
}

// ---------------------------------------------------------------------------
// toolwatch stats
// ---------------------------------------------------------------------------

#[test]
fn stats_prints_recorded_tools() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");
    record(&dir, "mcp__time__now", "true", "15", "-");

    toolwatch(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("git"))
        .stdout(predicate::str::contains("mcp__time__now"));
}

#[test]
fn stats_filters_by_family_and_tool() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");
    record(&dir, "mcp__time__now", "true", "15", "-");

    toolwatch(&dir)
        .args(["stats", "--family", "shell"])
        .assert()
        .success()
        .stdout(predicate::str::contains("git"))
        .stdout(predicate::str::contains("mcp__time__now").not());

    toolwatch(&dir)
        .args(["stats", "--tool", "mcp__time__now"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mcp__time__now"))
        .stdout(predicate::str::contains("git").not());
}

#[test]
fn stats_rejects_unknown_family() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .args(["stats", "--family", "cloud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown family"));
}

#[test]
fn stats_on_empty_store_reports_nothing_recorded() {
    let dir = TempDir::new().unwrap();
    toolwatch(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No statistics recorded yet."));
}

#[test]
fn stats_json_includes_derived_fields() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");

    toolwatch(&dir)
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reliability_score\""))
        .stdout(predicate::str::contains("\"performance_category\""));
}

// ---------------------------------------------------------------------------
// Self-healing persistence
// ---------------------------------------------------------------------------

#[test]
fn corrupt_stats_document_is_rebuilt_from_log() {
    let dir = TempDir::new().unwrap();
    record(&dir, "git", "true", "40", "-");

    std::fs::write(dir.path().join("logs/shell-stats.json"), "{ corrupted").unwrap();
    record(&dir, "git", "true", "44", "-");

    let stats = std::fs::read_to_string(dir.path().join("logs/shell-stats.json")).unwrap();
    assert!(stats.contains("\"total_calls\": 2"));
}
