//! Reliability scoring.
//!
//! Blends correctness, speed, and sample-size confidence into a single
//! 0-100 scalar: up to 70 points for success rate, up to 20 for average
//! latency, up to 10 for call volume. The stability term deliberately
//! holds down tools with too few calls to judge, even at a perfect rate.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Score factors
// ---------------------------------------------------------------------------

/// Latency contribution: <500ms earns the full 20 points, degrading in
/// fixed bands to 0 at 5s and beyond.
pub fn performance_factor(average_response_time: f64) -> u32 {
    if average_response_time < 500.0 {
        20
    } else if average_response_time < 1000.0 {
        15
    } else if average_response_time < 2000.0 {
        10
    } else if average_response_time < 5000.0 {
        5
    } else {
        0
    }
}

/// Sample-size contribution. Ten calls is the threshold for medium
/// confidence, matching the point where trend becomes meaningful.
pub fn stability_factor(total_calls: u64) -> u32 {
    if total_calls > 20 {
        10
    } else if total_calls >= 10 {
        7
    } else if total_calls > 5 {
        5
    } else {
        total_calls as u32
    }
}

/// Composite reliability score, integer-valued in [0, 100].
pub fn reliability_score(success_rate: f64, average_response_time: f64, total_calls: u64) -> f64 {
    let success_factor = success_rate * 70.0;
    let score = success_factor
        + f64::from(performance_factor(average_response_time))
        + f64::from(stability_factor(total_calls));
    score.round().clamp(0.0, 100.0)
}

// ---------------------------------------------------------------------------
// PerformanceCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    Fast,
    Normal,
    Slow,
    VerySlow,
}

impl PerformanceCategory {
    pub fn of(average_response_time: f64) -> PerformanceCategory {
        if average_response_time < 500.0 {
            PerformanceCategory::Fast
        } else if average_response_time < 2000.0 {
            PerformanceCategory::Normal
        } else if average_response_time < 5000.0 {
            PerformanceCategory::Slow
        } else {
            PerformanceCategory::VerySlow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceCategory::Fast => "fast",
            PerformanceCategory::Normal => "normal",
            PerformanceCategory::Slow => "slow",
            PerformanceCategory::VerySlow => "very_slow",
        }
    }
}

impl fmt::Display for PerformanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Direction of a tool's recent success rate. Only meaningful once a tool
/// has at least [`Trend::MIN_CALLS`] recorded calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub const MIN_CALLS: u64 = 10;

    /// Band a windowed success rate: >0.9 improving, <0.7 declining.
    pub fn of_rate(recent_success_rate: f64) -> Trend {
        if recent_success_rate > 0.9 {
            Trend::Improving
        } else if recent_success_rate < 0.7 {
            Trend::Declining
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Declining => "declining",
            Trend::Stable => "stable",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
