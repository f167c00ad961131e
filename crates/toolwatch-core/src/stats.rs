//! Per-tool cumulative statistics.
//!
//! The statistics document is a derived cache: the execution log is the
//! source of truth, and [`rebuild`] folds the whole log back into a
//! `StatsMap` on every update. Rates and averages are always recomputed
//! from counters and totals, never carried as running averages.

use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::record::{truncate_chars, ExecutionRecord};
use crate::score::{self, PerformanceCategory, Trend};
use crate::taxonomy::ErrorClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

/// Error keys in `common_errors` are the first 50 characters of the text.
pub const ERROR_KEY_MAX: usize = 50;

/// Window length for trend evaluation.
const TREND_WINDOW: usize = 10;

pub type StatsMap = BTreeMap<String, ToolStats>;

// ---------------------------------------------------------------------------
// ToolStats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    /// successful_calls / total_calls; 0 when no calls recorded.
    pub success_rate: f64,
    pub total_response_time: f64,
    pub average_response_time: f64,
    /// Truncated error text → occurrence count. Cardinality is capped by
    /// `Config::common_error_cap`; the least-frequent key is evicted first.
    #[serde(default)]
    pub common_errors: BTreeMap<String, u64>,
    /// Taxonomy label → count. Bounded by the seven fixed labels.
    #[serde(default)]
    pub error_patterns: BTreeMap<ErrorClass, u64>,
    pub reliability_score: f64,
    pub trend: Trend,
    pub performance_category: PerformanceCategory,
    pub last_updated: DateTime<Utc>,
}

impl ToolStats {
    fn zeroed(timestamp: DateTime<Utc>) -> Self {
        Self {
            total_calls: 0,
            successful_calls: 0,
            failed_calls: 0,
            success_rate: 0.0,
            total_response_time: 0.0,
            average_response_time: 0.0,
            common_errors: BTreeMap::new(),
            error_patterns: BTreeMap::new(),
            reliability_score: 0.0,
            trend: Trend::Stable,
            performance_category: PerformanceCategory::Fast,
            last_updated: timestamp,
        }
    }

    /// Fold one execution into the cumulative record, then recompute every
    /// derived field from the updated counters.
    fn apply(&mut self, record: &ExecutionRecord, common_error_cap: usize) {
        self.total_calls += 1;
        self.total_response_time += record.latency_ms.max(0.0);

        if record.outcome.is_success() {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
            if let Some(error) = &record.error {
                self.record_error_key(error, common_error_cap);
                if let Some(class) = ErrorClass::classify(error) {
                    *self.error_patterns.entry(class).or_insert(0) += 1;
                }
            }
        }

        self.success_rate = self.successful_calls as f64 / self.total_calls as f64;
        self.average_response_time = self.total_response_time / self.total_calls as f64;
        self.reliability_score = score::reliability_score(
            self.success_rate,
            self.average_response_time,
            self.total_calls,
        );
        self.performance_category = PerformanceCategory::of(self.average_response_time);
        self.last_updated = record.timestamp;
    }

    fn record_error_key(&mut self, error: &str, cap: usize) {
        let key = truncate_chars(error.trim(), ERROR_KEY_MAX);
        if key.is_empty() {
            return;
        }
        if let Some(count) = self.common_errors.get_mut(&key) {
            *count += 1;
            return;
        }
        if cap > 0 && self.common_errors.len() >= cap {
            // Evict the least-frequent key (ties: first in key order).
            if let Some(evict) = self
                .common_errors
                .iter()
                .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
                .map(|(k, _)| k.clone())
            {
                self.common_errors.remove(&evict);
            }
        }
        self.common_errors.insert(key, 1);
    }
}

// ---------------------------------------------------------------------------
// StatsBuilder
// ---------------------------------------------------------------------------

/// Folds execution records into a `StatsMap`, keeping a per-tool window of
/// recent outcomes so trend reflects current behavior rather than the
/// lifetime rate.
pub struct StatsBuilder {
    common_error_cap: usize,
    stats: StatsMap,
    recent: BTreeMap<String, VecDeque<bool>>,
}

impl StatsBuilder {
    pub fn new(common_error_cap: usize) -> Self {
        Self {
            common_error_cap,
            stats: StatsMap::new(),
            recent: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, record: &ExecutionRecord) {
        let entry = self
            .stats
            .entry(record.tool_name.clone())
            .or_insert_with(|| ToolStats::zeroed(record.timestamp));
        entry.apply(record, self.common_error_cap);

        let window = self.recent.entry(record.tool_name.clone()).or_default();
        window.push_back(record.outcome.is_success());
        if window.len() > TREND_WINDOW {
            window.pop_front();
        }

        if entry.total_calls >= Trend::MIN_CALLS {
            let successes = window.iter().filter(|ok| **ok).count();
            entry.trend = Trend::of_rate(successes as f64 / window.len() as f64);
        }
    }

    pub fn finish(self) -> StatsMap {
        self.stats
    }

    pub fn stats(&self) -> &StatsMap {
        &self.stats
    }
}

/// Rebuild the full statistics map from a log snapshot.
pub fn rebuild(records: &[ExecutionRecord], common_error_cap: usize) -> StatsMap {
    let mut builder = StatsBuilder::new(common_error_cap);
    for record in records {
        builder.push(record);
    }
    builder.finish()
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Load a statistics document. Absent, corrupt, or unreadable files read as
/// an empty map; the next rebuild repairs the document.
pub fn load(path: &Path) -> StatsMap {
    match std::fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_default(),
        Err(_) => StatsMap::new(),
    }
}

/// Atomically rewrite the statistics document in full.
pub fn save(path: &Path, stats: &StatsMap) -> Result<()> {
    let data = serde_json::to_string_pretty(stats)?;
    io::atomic_write(path, data.as_bytes())
}

/// Rebuild from the family log and persist the derived document.
pub fn rebuild_from_log(config: &Config, log_path: &Path, stats_path: &Path) -> Result<StatsMap> {
    let records = crate::record::read_log(log_path)?;
    let stats = rebuild(&records, config.common_error_cap);
    save(stats_path, &stats)?;
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
