//! Rule-based recommendations.
//!
//! Derived from the same snapshot as the analysis document and persisted
//! separately as a condensed, consumer-facing view. The alerting path in
//! the tracker reads this document back to attach a suggestion to
//! repeated-failure warnings.

use crate::analysis::{EcosystemHealth, PerformanceInsights, ReliabilityTiers, ToolEntry, UsagePatterns};
use crate::category::Category;
use crate::error::Result;
use crate::family::{ToolFamily, MCP_PREFIX};
use crate::io;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// MCP adoption rate below which a habit-change suggestion fires.
const LOW_ADOPTION_THRESHOLD: f64 = 0.3;

/// Average latency above which an optimization suggestion fires.
const SLOW_TOOL_THRESHOLD_MS: f64 = 2000.0;

/// A substitution fires only when the legacy tool's success rate is below this.
const SUBSTITUTION_RATE_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImmediateAction {
    pub action: String,
    pub priority: String,
    pub reason: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Substitution {
    pub alternative: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Optimization {
    pub tool: String,
    pub current_time_ms: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitChange {
    pub habit: String,
    pub reason: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemImprovement {
    pub improvement: String,
    pub current_score: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate_actions: Vec<ImmediateAction>,
    pub tool_substitutions: BTreeMap<String, Substitution>,
    pub optimization_opportunities: Vec<Optimization>,
    pub habit_changes: Vec<HabitChange>,
    pub system_improvements: Vec<SystemImprovement>,
}

impl Recommendations {
    /// The suggestion attached to a tool's investigate action, if any.
    pub fn suggestion_for(&self, tool_name: &str) -> Option<&str> {
        self.immediate_actions
            .iter()
            .find(|a| a.action.contains(tool_name))
            .map(|a| a.suggestion.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rule tables
// ---------------------------------------------------------------------------

/// Legacy shell tool → known faster/more robust alternative.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("find", "fd"),
    ("grep", "rg"),
    ("cat", "bat"),
    ("ls", "eza"),
];

fn fix_suggestion(family: ToolFamily, tool_name: &str) -> String {
    match family {
        ToolFamily::Shell => format!("Check {tool_name} installation and permissions"),
        ToolFamily::Mcp => {
            if tool_name.starts_with("mcp__github__") {
                "Verify GitHub token and API limits".to_string()
            } else if tool_name.starts_with("mcp__playwright__") {
                "Ensure browser dependencies are installed".to_string()
            } else {
                "Review tool configuration and error logs".to_string()
            }
        }
    }
}

fn optimization_suggestion(category: Category) -> String {
    match category {
        Category::FileOperations => "Consider modern alternatives like fd, rg, or bat",
        Category::SourceControl => "Use batch operations or reduce payload size",
        Category::CloudServices => "Check network connectivity and service regions",
        Category::BrowserAutomation => "Use headless mode or reduce wait times",
        Category::AiServices => "Consider caching responses or reducing context size",
        _ => "Review parameters and consider alternative approaches",
    }
    .to_string()
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

pub fn generate(
    tools: &[ToolEntry],
    tiers: &ReliabilityTiers,
    usage: &UsagePatterns,
    performance: &PerformanceInsights,
    health: &EcosystemHealth,
) -> Recommendations {
    let mut recs = Recommendations::default();

    // Critical-tier tools warrant investigation before anything else.
    for entry in &tiers.tier_5_critical {
        let family = if entry.tool.starts_with(MCP_PREFIX) {
            ToolFamily::Mcp
        } else {
            ToolFamily::Shell
        };
        recs.immediate_actions.push(ImmediateAction {
            action: format!("Investigate {} failures", entry.tool),
            priority: "high".to_string(),
            reason: format!("Success rate: {:.1}%", entry.success_rate * 100.0),
            suggestion: fix_suggestion(family, &entry.tool),
        });
    }

    for (legacy, alternative) in SUBSTITUTIONS {
        let Some(entry) = tools.iter().find(|t| t.name == *legacy) else {
            continue;
        };
        if entry.stats.success_rate < SUBSTITUTION_RATE_THRESHOLD {
            recs.tool_substitutions.insert(
                (*legacy).to_string(),
                Substitution {
                    alternative: (*alternative).to_string(),
                    reason: format!(
                        "Current success rate: {:.1}%",
                        entry.stats.success_rate * 100.0
                    ),
                },
            );
        }
    }

    for slow in &performance.slowest_tools {
        if slow.avg_time_ms > SLOW_TOOL_THRESHOLD_MS {
            recs.optimization_opportunities.push(Optimization {
                tool: slow.tool.clone(),
                current_time_ms: slow.avg_time_ms,
                suggestion: optimization_suggestion(slow.category),
            });
        }
    }

    let adoption = usage.family_usage.mcp_adoption_rate;
    if adoption < LOW_ADOPTION_THRESHOLD {
        recs.habit_changes.push(HabitChange {
            habit: "Increase MCP tool usage".to_string(),
            reason: format!("Current MCP adoption: {:.1}%", adoption * 100.0),
            suggestion:
                "Consider MCP equivalents for git, file operations, and cloud services"
                    .to_string(),
        });
    }

    if health.health_score < 80.0 {
        recs.system_improvements.push(SystemImprovement {
            improvement: "Overall tool reliability".to_string(),
            current_score: health.health_score,
            suggestion: "Focus on fixing tools in tier 4 and 5 reliability".to_string(),
        });
    }

    recs
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

pub fn save(path: &Path, recs: &Recommendations) -> Result<()> {
    let data = serde_json::to_string_pretty(recs)?;
    io::atomic_write(path, data.as_bytes())
}

/// Load the last-generated recommendations. Absent or corrupt reads as none.
pub fn load(path: &Path) -> Option<Recommendations> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
