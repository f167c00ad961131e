use crate::output::{print_json, print_table};
use toolwatch_core::config::Config;
use toolwatch_core::family::ToolFamily;
use toolwatch_core::paths;
use toolwatch_core::stats::{self, ToolStats};

pub fn run(
    config: &Config,
    family: Option<&str>,
    tool: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let families: Vec<ToolFamily> = match family {
        Some("mcp") => vec![ToolFamily::Mcp],
        Some("shell") => vec![ToolFamily::Shell],
        Some(other) => anyhow::bail!("unknown family '{other}' (expected mcp or shell)"),
        None => ToolFamily::all().to_vec(),
    };

    let mut entries: Vec<(ToolFamily, String, ToolStats)> = Vec::new();
    for fam in families {
        let map = stats::load(&paths::stats_path(&config.base_dir, fam));
        for (name, tool_stats) in map {
            if tool.is_some_and(|t| t != name) {
                continue;
            }
            entries.push((fam, name, tool_stats));
        }
    }
    entries.sort_by(|a, b| a.1.cmp(&b.1));

    if json {
        #[derive(serde::Serialize)]
        struct StatsRow<'a> {
            family: &'static str,
            tool: &'a str,
            #[serde(flatten)]
            stats: &'a ToolStats,
        }

        let rows: Vec<StatsRow> = entries
            .iter()
            .map(|(fam, name, tool_stats)| StatsRow {
                family: fam.as_str(),
                tool: name,
                stats: tool_stats,
            })
            .collect();
        return print_json(&rows);
    }

    if entries.is_empty() {
        println!("No statistics recorded yet.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|(fam, name, s)| {
            vec![
                name.clone(),
                fam.as_str().to_string(),
                s.total_calls.to_string(),
                format!("{:.1}%", s.success_rate * 100.0),
                format!("{:.0}", s.average_response_time),
                format!("{:.0}", s.reliability_score),
                s.trend.as_str().to_string(),
                s.performance_category.as_str().to_string(),
            ]
        })
        .collect();

    print_table(
        &[
            "TOOL", "FAMILY", "CALLS", "SUCCESS", "AVG_MS", "SCORE", "TREND", "PERF",
        ],
        rows,
    );
    Ok(())
}
