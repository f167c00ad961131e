use toolwatch_core::config::Config;
use toolwatch_core::tracker::{self, Invocation, Tracked};

/// Sentinel values the hook layer passes when there is no error output.
fn parse_error_arg(error: &str) -> Option<String> {
    let trimmed = error.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn run(
    config: &Config,
    tool_name: &str,
    success: bool,
    latency_ms: f64,
    error: &str,
    session_id: &str,
) -> anyhow::Result<()> {
    // The invocation contract is the only thing that may fail this command;
    // everything past this point is fire-and-forget telemetry.
    if !latency_ms.is_finite() || latency_ms < 0.0 {
        anyhow::bail!("latency must be a non-negative number of milliseconds, got {latency_ms}");
    }

    let invocation = Invocation {
        tool_name: tool_name.to_string(),
        success,
        latency_ms,
        error: parse_error_arg(error),
        session_id: session_id.to_string(),
    };

    match tracker::track(config, &invocation) {
        Tracked::Recorded(family) => {
            tracing::debug!("recorded {tool_name} in {family} family");
        }
        Tracked::Ignored => {
            tracing::debug!("ignored untracked tool name {tool_name}");
        }
    }
    Ok(())
}
