//! Ecosystem analysis.
//!
//! Batch job over both family statistics documents. Merges every tracked
//! tool into one snapshot tagged by family and functional category, then
//! derives health, tiers, usage, performance, error correlations, adoption,
//! temporal and security views, plus rule-based recommendations. The
//! analysis is a pure function of the snapshot: rerunning it on unchanged
//! statistics yields identical output except for `generated_at`.

use crate::category::{self, Category};
use crate::config::Config;
use crate::error::Result;
use crate::family::ToolFamily;
use crate::io;
use crate::paths;
use crate::recommend::{self, Recommendations};
use crate::score::Trend;
use crate::stats::{self, StatsMap, ToolStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// An error is systemic when it recurs across at least this many tools.
pub const SYSTEMIC_TOOL_THRESHOLD: usize = 3;

/// Network-touching call volume above which a security note is raised.
pub const NETWORK_VOLUME_THRESHOLD: u64 = 100;

// ---------------------------------------------------------------------------
// Snapshot entry
// ---------------------------------------------------------------------------

/// One tool in the merged snapshot the analyzer works over.
pub struct ToolEntry<'a> {
    pub name: &'a str,
    pub family: ToolFamily,
    pub category: Category,
    pub stats: &'a ToolStats,
}

fn merge_snapshot<'a>(mcp: &'a StatsMap, shell: &'a StatsMap) -> Vec<ToolEntry<'a>> {
    let mut entries: Vec<ToolEntry> = Vec::with_capacity(mcp.len() + shell.len());
    for (name, stats) in shell {
        entries.push(ToolEntry {
            name,
            family: ToolFamily::Shell,
            category: category::categorize(ToolFamily::Shell, name),
            stats,
        });
    }
    for (name, stats) in mcp {
        entries.push(ToolEntry {
            name,
            family: ToolFamily::Mcp,
            category: category::categorize(ToolFamily::Mcp, name),
            stats,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(b.name));
    entries
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCategory {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthCategory::Excellent => "excellent",
            HealthCategory::Good => "good",
            HealthCategory::Fair => "fair",
            HealthCategory::Poor => "poor",
            HealthCategory::Critical => "critical",
        }
    }

    pub fn of(score: f64) -> HealthCategory {
        if score >= 90.0 {
            HealthCategory::Excellent
        } else if score >= 80.0 {
            HealthCategory::Good
        } else if score >= 70.0 {
            HealthCategory::Fair
        } else if score >= 60.0 {
            HealthCategory::Poor
        } else {
            HealthCategory::Critical
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemHealth {
    pub total_tools: usize,
    /// Tools with success_rate > 0.8.
    pub reliable_tools: usize,
    /// Tools with success_rate < 0.5.
    pub unreliable_tools: usize,
    pub health_score: f64,
    pub health_category: HealthCategory,
}

fn analyze_health(tools: &[ToolEntry]) -> EcosystemHealth {
    let total_tools = tools.len();
    let reliable_tools = tools.iter().filter(|t| t.stats.success_rate > 0.8).count();
    let unreliable_tools = tools.iter().filter(|t| t.stats.success_rate < 0.5).count();
    let health_score = if total_tools > 0 {
        reliable_tools as f64 / total_tools as f64 * 100.0
    } else {
        0.0
    };
    EcosystemHealth {
        total_tools,
        reliable_tools,
        unreliable_tools,
        health_score,
        health_category: HealthCategory::of(health_score),
    }
}

// ---------------------------------------------------------------------------
// Reliability tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierEntry {
    pub tool: String,
    pub success_rate: f64,
    pub family: ToolFamily,
}

/// Five disjoint buckets by success rate. Every tool lands in exactly one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReliabilityTiers {
    /// success_rate >= 0.95
    pub tier_1_excellent: Vec<TierEntry>,
    /// 0.85 <= success_rate < 0.95
    pub tier_2_good: Vec<TierEntry>,
    /// 0.70 <= success_rate < 0.85
    pub tier_3_fair: Vec<TierEntry>,
    /// 0.50 <= success_rate < 0.70
    pub tier_4_poor: Vec<TierEntry>,
    /// success_rate < 0.50
    pub tier_5_critical: Vec<TierEntry>,
}

fn analyze_tiers(tools: &[ToolEntry]) -> ReliabilityTiers {
    let mut tiers = ReliabilityTiers::default();
    for t in tools {
        let entry = TierEntry {
            tool: t.name.to_string(),
            success_rate: t.stats.success_rate,
            family: t.family,
        };
        let rate = t.stats.success_rate;
        if rate >= 0.95 {
            tiers.tier_1_excellent.push(entry);
        } else if rate >= 0.85 {
            tiers.tier_2_good.push(entry);
        } else if rate >= 0.70 {
            tiers.tier_3_fair.push(entry);
        } else if rate >= 0.50 {
            tiers.tier_4_poor.push(entry);
        } else {
            tiers.tier_5_critical.push(entry);
        }
    }
    tiers
}

// ---------------------------------------------------------------------------
// Usage patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEntry {
    pub tool: String,
    pub usage_count: u64,
    pub family: ToolFamily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyUsage {
    pub shell_usage: u64,
    pub mcp_usage: u64,
    /// mcp / (mcp + shell); 0 with no usage at all.
    pub mcp_adoption_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsagePatterns {
    pub most_used_tools: Vec<UsageEntry>,
    pub least_used_tools: Vec<UsageEntry>,
    pub family_usage: FamilyUsage,
    pub category_usage: BTreeMap<Category, u64>,
}

fn usage_entry(t: &ToolEntry) -> UsageEntry {
    UsageEntry {
        tool: t.name.to_string(),
        usage_count: t.stats.total_calls,
        family: t.family,
    }
}

fn analyze_usage(tools: &[ToolEntry]) -> UsagePatterns {
    let mut by_usage: Vec<&ToolEntry> = tools.iter().collect();
    // Ties break on name so output is stable across runs.
    by_usage.sort_by(|a, b| {
        b.stats
            .total_calls
            .cmp(&a.stats.total_calls)
            .then_with(|| a.name.cmp(b.name))
    });

    let most_used_tools: Vec<UsageEntry> =
        by_usage.iter().take(10).map(|t| usage_entry(t)).collect();
    let least_used_tools: Vec<UsageEntry> = by_usage
        .iter()
        .rev()
        .take(10)
        .map(|t| usage_entry(t))
        .collect();

    let shell_usage: u64 = tools
        .iter()
        .filter(|t| t.family == ToolFamily::Shell)
        .map(|t| t.stats.total_calls)
        .sum();
    let mcp_usage: u64 = tools
        .iter()
        .filter(|t| t.family == ToolFamily::Mcp)
        .map(|t| t.stats.total_calls)
        .sum();
    let total = shell_usage + mcp_usage;
    let mcp_adoption_rate = if total > 0 {
        mcp_usage as f64 / total as f64
    } else {
        0.0
    };

    let mut category_usage: BTreeMap<Category, u64> = BTreeMap::new();
    for t in tools {
        *category_usage.entry(t.category).or_insert(0) += t.stats.total_calls;
    }

    UsagePatterns {
        most_used_tools,
        least_used_tools,
        family_usage: FamilyUsage {
            shell_usage,
            mcp_usage,
            mcp_adoption_rate,
        },
        category_usage,
    }
}

// ---------------------------------------------------------------------------
// Performance insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfEntry {
    pub tool: String,
    pub avg_time_ms: f64,
    pub family: ToolFamily,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPerformance {
    pub avg_time_ms: f64,
    pub min_time_ms: f64,
    pub max_time_ms: f64,
    pub tool_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceInsights {
    pub fastest_tools: Vec<PerfEntry>,
    pub slowest_tools: Vec<PerfEntry>,
    pub performance_by_category: BTreeMap<Category, CategoryPerformance>,
}

fn analyze_performance(tools: &[ToolEntry]) -> PerformanceInsights {
    // Only tools that have actually reported latency.
    let mut timed: Vec<&ToolEntry> = tools
        .iter()
        .filter(|t| t.stats.average_response_time > 0.0)
        .collect();
    timed.sort_by(|a, b| {
        a.stats
            .average_response_time
            .total_cmp(&b.stats.average_response_time)
            .then_with(|| a.name.cmp(b.name))
    });

    let perf_entry = |t: &ToolEntry| PerfEntry {
        tool: t.name.to_string(),
        avg_time_ms: t.stats.average_response_time,
        family: t.family,
        category: t.category,
    };

    let fastest_tools: Vec<PerfEntry> = timed.iter().take(10).map(|t| perf_entry(t)).collect();
    let slowest_tools: Vec<PerfEntry> =
        timed.iter().rev().take(10).map(|t| perf_entry(t)).collect();

    let mut grouped: BTreeMap<Category, Vec<f64>> = BTreeMap::new();
    for t in &timed {
        grouped
            .entry(t.category)
            .or_default()
            .push(t.stats.average_response_time);
    }
    let performance_by_category = grouped
        .into_iter()
        .map(|(cat, times)| {
            let sum: f64 = times.iter().sum();
            let min = times.iter().copied().fold(f64::INFINITY, f64::min);
            let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (
                cat,
                CategoryPerformance {
                    avg_time_ms: sum / times.len() as f64,
                    min_time_ms: min,
                    max_time_ms: max,
                    tool_count: times.len(),
                },
            )
        })
        .collect();

    PerformanceInsights {
        fastest_tools,
        slowest_tools,
        performance_by_category,
    }
}

// ---------------------------------------------------------------------------
// Error correlations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCount {
    pub error: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemicIssue {
    pub error: String,
    pub affected_tools: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCorrelations {
    /// Top 10 error texts by total occurrence count across all tools.
    pub common_error_patterns: Vec<ErrorCount>,
    /// Error text → distinct tools sharing it (only when shared by >1).
    pub tools_with_similar_errors: BTreeMap<String, Vec<String>>,
    pub systemic_issues: Vec<SystemicIssue>,
}

fn analyze_error_correlations(tools: &[ToolEntry]) -> ErrorCorrelations {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut by_error: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for t in tools {
        for (error, count) in &t.stats.common_errors {
            *counts.entry(error).or_insert(0) += count;
            by_error.entry(error).or_default().push(t.name);
        }
    }

    let mut ranked: Vec<ErrorCount> = counts
        .iter()
        .map(|(error, count)| ErrorCount {
            error: (*error).to_string(),
            count: *count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.error.cmp(&b.error)));
    ranked.truncate(10);

    let mut tools_with_similar_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut systemic_issues = Vec::new();
    for (error, mut affected) in by_error {
        affected.sort_unstable();
        affected.dedup();
        if affected.len() <= 1 {
            continue;
        }
        let affected: Vec<String> = affected.iter().map(|t| t.to_string()).collect();
        if affected.len() >= SYSTEMIC_TOOL_THRESHOLD {
            systemic_issues.push(SystemicIssue {
                error: error.to_string(),
                affected_tools: affected.clone(),
                severity: if affected.len() > 5 {
                    Severity::High
                } else {
                    Severity::Medium
                },
            });
        }
        tools_with_similar_errors.insert(error.to_string(), affected);
    }

    ErrorCorrelations {
        common_error_patterns: ranked,
        tools_with_similar_errors,
        systemic_issues,
    }
}

// ---------------------------------------------------------------------------
// MCP adoption
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpAdoptionMetrics {
    pub mcp_tool_count: usize,
    pub shell_tool_count: usize,
    pub mcp_categories: BTreeMap<Category, Vec<String>>,
    pub adoption_rate: f64,
    pub top_mcp_tools: Vec<UsageEntry>,
    /// Mean success rate across MCP tools; 0 with none tracked.
    pub mcp_success_rate: f64,
}

fn analyze_mcp_adoption(tools: &[ToolEntry], usage: &UsagePatterns) -> McpAdoptionMetrics {
    let mcp: Vec<&ToolEntry> = tools.iter().filter(|t| t.family == ToolFamily::Mcp).collect();
    let shell_tool_count = tools.len() - mcp.len();

    let mut mcp_categories: BTreeMap<Category, Vec<String>> = BTreeMap::new();
    for t in &mcp {
        mcp_categories
            .entry(t.category)
            .or_default()
            .push(t.name.to_string());
    }

    let mut top_mcp_tools: Vec<UsageEntry> = mcp.iter().map(|t| usage_entry(t)).collect();
    top_mcp_tools.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| a.tool.cmp(&b.tool))
    });
    top_mcp_tools.truncate(5);

    let mcp_success_rate = if mcp.is_empty() {
        0.0
    } else {
        mcp.iter().map(|t| t.stats.success_rate).sum::<f64>() / mcp.len() as f64
    };

    McpAdoptionMetrics {
        mcp_tool_count: mcp.len(),
        shell_tool_count,
        mcp_categories,
        adoption_rate: usage.family_usage.mcp_adoption_rate,
        top_mcp_tools,
        mcp_success_rate,
    }
}

// ---------------------------------------------------------------------------
// Temporal patterns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageFrequency {
    pub usage_count: u64,
    pub category: Category,
    pub family: ToolFamily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub trend: Trend,
    pub reliability_score: f64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentCycleUsage {
    pub usage_count: u64,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceUsage {
    pub usage_count: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalPatterns {
    /// Per-tool call volume, for tools used at least once.
    pub usage_frequency: BTreeMap<String, UsageFrequency>,
    pub trends: BTreeMap<String, TrendSnapshot>,
    /// Tools in development / source-control / file-operation categories.
    pub development_cycles: BTreeMap<String, DevelopmentCycleUsage>,
    /// Tools in system-operation / process-management categories.
    pub maintenance_windows: BTreeMap<String, MaintenanceUsage>,
}

fn analyze_temporal(tools: &[ToolEntry]) -> TemporalPatterns {
    let mut usage_frequency = BTreeMap::new();
    let mut trends = BTreeMap::new();
    let mut development_cycles = BTreeMap::new();
    let mut maintenance_windows = BTreeMap::new();

    for t in tools {
        if t.stats.total_calls > 0 {
            usage_frequency.insert(
                t.name.to_string(),
                UsageFrequency {
                    usage_count: t.stats.total_calls,
                    category: t.category,
                    family: t.family,
                },
            );
        }
        trends.insert(
            t.name.to_string(),
            TrendSnapshot {
                trend: t.stats.trend,
                reliability_score: t.stats.reliability_score,
                last_updated: t.stats.last_updated,
            },
        );
        if matches!(
            t.category,
            Category::Development | Category::SourceControl | Category::FileOperations
        ) {
            development_cycles.insert(
                t.name.to_string(),
                DevelopmentCycleUsage {
                    usage_count: t.stats.total_calls,
                    category: t.category,
                },
            );
        }
        if matches!(
            t.category,
            Category::SystemOperations | Category::ProcessManagement
        ) {
            maintenance_windows.insert(
                t.name.to_string(),
                MaintenanceUsage {
                    usage_count: t.stats.total_calls,
                    success_rate: t.stats.success_rate,
                },
            );
        }
    }

    TemporalPatterns {
        usage_frequency,
        trends,
        development_cycles,
        maintenance_windows,
    }
}

// ---------------------------------------------------------------------------
// Security insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivilegedOperation {
    pub usage_count: u64,
    pub success_rate: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkOperation {
    pub usage_count: u64,
    pub success_rate: f64,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAccessPattern {
    pub usage_count: u64,
    pub success_rate: f64,
    pub avg_time_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityRecommendation {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityInsights {
    pub privileged_operations: BTreeMap<String, PrivilegedOperation>,
    pub network_operations: BTreeMap<String, NetworkOperation>,
    pub file_access_patterns: BTreeMap<String, FileAccessPattern>,
    pub security_recommendations: Vec<SecurityRecommendation>,
}

fn analyze_security(tools: &[ToolEntry]) -> SecurityInsights {
    let mut privileged_operations = BTreeMap::new();
    let mut network_operations = BTreeMap::new();
    let mut file_access_patterns = BTreeMap::new();
    let mut security_recommendations = Vec::new();

    for t in tools {
        if category::name_matches_any(t.name, category::PRIVILEGED_KEYWORDS) {
            privileged_operations.insert(
                t.name.to_string(),
                PrivilegedOperation {
                    usage_count: t.stats.total_calls,
                    success_rate: t.stats.success_rate,
                    risk_level: if t.stats.success_rate < 0.9 {
                        RiskLevel::High
                    } else {
                        RiskLevel::Medium
                    },
                },
            );
        }
        if category::name_matches_any(t.name, category::NETWORK_KEYWORDS) {
            network_operations.insert(
                t.name.to_string(),
                NetworkOperation {
                    usage_count: t.stats.total_calls,
                    success_rate: t.stats.success_rate,
                    category: t.category,
                },
            );
        }
        if category::name_matches_any(t.name, category::FILE_ACCESS_KEYWORDS) {
            file_access_patterns.insert(
                t.name.to_string(),
                FileAccessPattern {
                    usage_count: t.stats.total_calls,
                    success_rate: t.stats.success_rate,
                    avg_time_ms: t.stats.average_response_time,
                },
            );
        }
        if t.stats.success_rate < 0.8 && t.name.to_lowercase().contains("rm") {
            security_recommendations.push(SecurityRecommendation {
                kind: "high_risk_operation".to_string(),
                tool: Some(t.name.to_string()),
                issue: "Low success rate for destructive operation".to_string(),
                recommendation: "Review rm usage and consider safer alternatives".to_string(),
            });
        }
    }

    let network_volume: u64 = tools
        .iter()
        .filter(|t| {
            let lower = t.name.to_lowercase();
            lower.contains("curl") || lower.contains("wget")
        })
        .map(|t| t.stats.total_calls)
        .sum();
    if network_volume > NETWORK_VOLUME_THRESHOLD {
        security_recommendations.push(SecurityRecommendation {
            kind: "network_security".to_string(),
            tool: None,
            issue: format!("High network tool usage ({network_volume} calls)"),
            recommendation: "Review network operations for potential security implications"
                .to_string(),
        });
    }

    SecurityInsights {
        privileged_operations,
        network_operations,
        file_access_patterns,
        security_recommendations,
    }
}

// ---------------------------------------------------------------------------
// EcosystemAnalysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemAnalysis {
    pub ecosystem_health: EcosystemHealth,
    pub tool_categories: BTreeMap<String, Category>,
    pub reliability_tiers: ReliabilityTiers,
    pub usage_patterns: UsagePatterns,
    pub performance_insights: PerformanceInsights,
    pub error_correlations: ErrorCorrelations,
    pub recommendations: Recommendations,
    pub mcp_adoption_metrics: McpAdoptionMetrics,
    pub temporal_patterns: TemporalPatterns,
    pub security_insights: SecurityInsights,
    pub generated_at: DateTime<Utc>,
}

/// Derive the full analysis from a snapshot of both family stores.
pub fn analyze(mcp: &StatsMap, shell: &StatsMap) -> EcosystemAnalysis {
    let tools = merge_snapshot(mcp, shell);

    let ecosystem_health = analyze_health(&tools);
    let tool_categories = tools
        .iter()
        .map(|t| (t.name.to_string(), t.category))
        .collect();
    let reliability_tiers = analyze_tiers(&tools);
    let usage_patterns = analyze_usage(&tools);
    let performance_insights = analyze_performance(&tools);
    let error_correlations = analyze_error_correlations(&tools);
    let mcp_adoption_metrics = analyze_mcp_adoption(&tools, &usage_patterns);
    let temporal_patterns = analyze_temporal(&tools);
    let security_insights = analyze_security(&tools);
    let recommendations = recommend::generate(
        &tools,
        &reliability_tiers,
        &usage_patterns,
        &performance_insights,
        &ecosystem_health,
    );

    EcosystemAnalysis {
        ecosystem_health,
        tool_categories,
        reliability_tiers,
        usage_patterns,
        performance_insights,
        error_correlations,
        recommendations,
        mcp_adoption_metrics,
        temporal_patterns,
        security_insights,
        generated_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Batch entry point
// ---------------------------------------------------------------------------

/// Load both family stores, analyze, and persist the full analysis plus the
/// condensed recommendations document. Never mutates the stores.
pub fn run(config: &Config) -> Result<EcosystemAnalysis> {
    let base = &config.base_dir;
    let mcp = stats::load(&paths::stats_path(base, ToolFamily::Mcp));
    let shell = stats::load(&paths::stats_path(base, ToolFamily::Shell));

    let analysis = analyze(&mcp, &shell);

    let data = serde_json::to_string_pretty(&analysis)?;
    io::atomic_write(&paths::analysis_path(base), data.as_bytes())?;
    recommend::save(&paths::recommendations_path(base), &analysis.recommendations)?;

    Ok(analysis)
}

/// Load a previously persisted analysis, if any. Corrupt files read as none.
pub fn load(path: &Path) -> Option<EcosystemAnalysis> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ExecutionRecord;
    use crate::stats::rebuild;

    fn stats_for(calls: &[(&str, bool, f64, Option<&str>)]) -> StatsMap {
        let records: Vec<ExecutionRecord> = calls
            .iter()
            .map(|(tool, ok, ms, err)| ExecutionRecord::new(*tool, *ok, *ms, *err, "sess"))
            .collect();
        rebuild(&records, 24)
    }

    fn repeat<'a>(
        tool: &'a str,
        ok: bool,
        ms: f64,
        err: Option<&'a str>,
        n: usize,
    ) -> Vec<(&'a str, bool, f64, Option<&'a str>)> {
        std::iter::repeat((tool, ok, ms, err)).take(n).collect()
    }

    #[test]
    fn empty_stores_produce_empty_healthy_skeleton() {
        let analysis = analyze(&StatsMap::new(), &StatsMap::new());
        assert_eq!(analysis.ecosystem_health.total_tools, 0);
        assert_eq!(analysis.ecosystem_health.health_score, 0.0);
        assert!(analysis.tool_categories.is_empty());
        assert!(analysis.usage_patterns.most_used_tools.is_empty());
    }

    #[test]
    fn health_counts_reliable_and_unreliable() {
        let shell = stats_for(
            &[
                repeat("git", true, 50.0, None, 9),
                repeat("git", false, 50.0, Some("x"), 1),
                repeat("curl", false, 50.0, Some("x"), 4),
            ]
            .concat(),
        );
        let analysis = analyze(&StatsMap::new(), &shell);
        let health = &analysis.ecosystem_health;
        assert_eq!(health.total_tools, 2);
        assert_eq!(health.reliable_tools, 1); // git at 0.9
        assert_eq!(health.unreliable_tools, 1); // curl at 0.0
        assert_eq!(health.health_score, 50.0);
        assert_eq!(health.health_category, HealthCategory::Critical);
    }

    #[test]
    fn tiers_partition_without_overlap_or_omission() {
        let shell = stats_for(
            &[
                repeat("a", true, 10.0, None, 20),                  // 1.0 → tier 1
                repeat("b", true, 10.0, None, 9),                   // 0.9 → tier 2
                repeat("b", false, 10.0, Some("x"), 1),
                repeat("c", true, 10.0, None, 3),                   // 0.75 → tier 3
                repeat("c", false, 10.0, Some("x"), 1),
                repeat("d", true, 10.0, None, 6),                   // 0.6 → tier 4
                repeat("d", false, 10.0, Some("x"), 4),
                repeat("e", false, 10.0, Some("x"), 5),             // 0.0 → tier 5
            ]
            .concat(),
        );
        let analysis = analyze(&StatsMap::new(), &shell);
        let tiers = &analysis.reliability_tiers;
        let placed = tiers.tier_1_excellent.len()
            + tiers.tier_2_good.len()
            + tiers.tier_3_fair.len()
            + tiers.tier_4_poor.len()
            + tiers.tier_5_critical.len();
        assert_eq!(placed, 5);
        assert_eq!(tiers.tier_1_excellent[0].tool, "a");
        assert_eq!(tiers.tier_2_good[0].tool, "b");
        assert_eq!(tiers.tier_3_fair[0].tool, "c");
        assert_eq!(tiers.tier_4_poor[0].tool, "d");
        assert_eq!(tiers.tier_5_critical[0].tool, "e");
    }

    #[test]
    fn adoption_rate_splits_usage_by_family() {
        let mcp = stats_for(&repeat("mcp__github__get_issue", true, 200.0, None, 3));
        let shell = stats_for(&repeat("git", true, 50.0, None, 7));
        let analysis = analyze(&mcp, &shell);
        let fu = &analysis.usage_patterns.family_usage;
        assert_eq!(fu.mcp_usage, 3);
        assert_eq!(fu.shell_usage, 7);
        assert!((fu.mcp_adoption_rate - 0.3).abs() < 1e-12);
        assert_eq!(analysis.mcp_adoption_metrics.mcp_tool_count, 1);
        assert_eq!(analysis.mcp_adoption_metrics.shell_tool_count, 1);
    }

    #[test]
    fn performance_ignores_tools_without_latency() {
        let shell = stats_for(
            &[
                repeat("fast", true, 100.0, None, 2),
                repeat("slow", true, 4000.0, None, 2),
                repeat("zero", true, 0.0, None, 2),
            ]
            .concat(),
        );
        let analysis = analyze(&StatsMap::new(), &shell);
        let perf = &analysis.performance_insights;
        assert_eq!(perf.fastest_tools.len(), 2);
        assert_eq!(perf.fastest_tools[0].tool, "fast");
        assert_eq!(perf.slowest_tools[0].tool, "slow");
        assert!(perf.fastest_tools.iter().all(|e| e.tool != "zero"));
    }

    #[test]
    fn systemic_issue_needs_three_distinct_tools() {
        let shell = stats_for(
            &[
                repeat("a", false, 1.0, Some("Rate limit exceeded"), 1),
                repeat("b", false, 1.0, Some("Rate limit exceeded"), 1),
                repeat("c", false, 1.0, Some("Rate limit exceeded"), 1),
                repeat("a", false, 1.0, Some("Invalid input format"), 2),
            ]
            .concat(),
        );
        let analysis = analyze(&StatsMap::new(), &shell);
        let corr = &analysis.error_correlations;
        assert_eq!(corr.systemic_issues.len(), 1);
        let issue = &corr.systemic_issues[0];
        assert_eq!(issue.error, "Rate limit exceeded");
        assert_eq!(issue.affected_tools, vec!["a", "b", "c"]);
        assert_eq!(issue.severity, Severity::Medium);
        // Shared by two tools is correlated but not systemic.
        assert!(!corr
            .tools_with_similar_errors
            .contains_key("Invalid input format"));
    }

    #[test]
    fn systemic_severity_high_above_five_tools() {
        let calls: Vec<(&str, bool, f64, Option<&str>)> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|t| (*t, false, 1.0, Some("Connection timeout")))
            .collect();
        let analysis = analyze(&StatsMap::new(), &stats_for(&calls));
        assert_eq!(
            analysis.error_correlations.systemic_issues[0].severity,
            Severity::High
        );
    }

    #[test]
    fn security_flags_privileged_and_network_tools() {
        let shell = stats_for(
            &[
                repeat("chmod", false, 1.0, Some("Permission denied"), 2),
                repeat("curl", true, 100.0, None, 3),
            ]
            .concat(),
        );
        let analysis = analyze(&StatsMap::new(), &shell);
        let sec = &analysis.security_insights;
        assert_eq!(sec.privileged_operations["chmod"].risk_level, RiskLevel::High);
        assert!(sec.network_operations.contains_key("curl"));
    }

    #[test]
    fn network_volume_recommendation_fires_above_threshold() {
        let calls = repeat("curl", true, 10.0, None, 101);
        let analysis = analyze(&StatsMap::new(), &stats_for(&calls));
        assert!(analysis
            .security_insights
            .security_recommendations
            .iter()
            .any(|r| r.kind == "network_security"));
    }

    #[test]
    fn analysis_is_idempotent_except_generated_at() {
        let mcp = stats_for(
            &[
                repeat("mcp__github__get_issue", true, 150.0, None, 5),
                repeat("mcp__playwright__click", false, 900.0, Some("timeout"), 2),
            ]
            .concat(),
        );
        let shell = stats_for(&repeat("git", true, 40.0, None, 12));

        let mut first = analyze(&mcp, &shell);
        let mut second = analyze(&mcp, &shell);
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        first.generated_at = epoch;
        second.generated_at = epoch;
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn run_persists_both_documents() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::new(dir.path());

        let shell = stats_for(&repeat("git", true, 40.0, None, 2));
        stats::save(&paths::stats_path(dir.path(), ToolFamily::Shell), &shell).unwrap();

        let analysis = run(&config).unwrap();
        assert_eq!(analysis.ecosystem_health.total_tools, 1);
        assert!(paths::analysis_path(dir.path()).exists());
        assert!(paths::recommendations_path(dir.path()).exists());

        let reloaded = load(&paths::analysis_path(dir.path())).unwrap();
        assert_eq!(reloaded.ecosystem_health.total_tools, 1);
    }
}
