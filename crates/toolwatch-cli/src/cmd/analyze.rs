use crate::output::print_json;
use anyhow::Context;
use toolwatch_core::analysis;
use toolwatch_core::config::Config;

pub fn run(config: &Config, json: bool) -> anyhow::Result<()> {
    let analysis = analysis::run(config).context("failed to analyze tool ecosystem")?;

    if json {
        return print_json(&analysis);
    }

    let health = &analysis.ecosystem_health;
    println!("Analyzed {} tools", health.total_tools);
    println!(
        "Health score: {:.1}% ({})",
        health.health_score,
        health.health_category.as_str()
    );

    let critical = analysis.reliability_tiers.tier_5_critical.len();
    if critical > 0 {
        println!("{critical} tools need immediate attention");
    }

    let actions = analysis.recommendations.immediate_actions.len();
    if actions > 0 {
        println!("{actions} immediate actions recommended");
    }

    let systemic = analysis.error_correlations.systemic_issues.len();
    if systemic > 0 {
        println!("{systemic} systemic issues detected");
    }

    Ok(())
}
