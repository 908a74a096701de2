//! Run-level aggregation of comparison records

use serde::{Deserialize, Serialize};

use crate::benchmark::BenchmarkError;
use crate::types::result::ComparisonRecord;

/// Spread of per-prompt speedups
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedupStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Illustrative extrapolation of per-query savings to a daily query volume.
/// Arithmetic only, nothing here is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessImpact {
    pub queries_per_day: u64,
    pub time_saved_per_query_secs: f64,
    pub total_hours_saved_per_day: f64,
    pub capacity_multiplier: f64,
}

impl BusinessImpact {
    pub fn project(
        baseline_latency: f64,
        speculative_latency: f64,
        speedup: f64,
        queries_per_day: u64,
    ) -> Self {
        let time_saved = baseline_latency - speculative_latency;
        Self {
            queries_per_day,
            time_saved_per_query_secs: time_saved,
            total_hours_saved_per_day: time_saved * queries_per_day as f64 / 3600.0,
            capacity_multiplier: speedup,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub prompts: usize,
    pub speedup: SpeedupStats,
    pub mean_baseline_latency: f64,
    pub mean_speculative_latency: f64,
    pub mean_latency_reduction_pct: f64,
    pub mean_baseline_tokens_per_sec: f64,
    pub mean_speculative_tokens_per_sec: f64,
    pub mean_throughput_increase_pct: f64,
    pub business_impact: BusinessImpact,
}

impl BenchmarkSummary {
    /// Aggregate a run. An empty run has no meaningful aggregate and is rejected.
    pub fn from_records(
        records: &[ComparisonRecord],
        queries_per_day: u64,
    ) -> Result<Self, BenchmarkError> {
        if records.is_empty() {
            return Err(BenchmarkError::EmptyRun);
        }

        let speedups: Vec<f64> = records.iter().map(|r| r.speedup).collect();
        let speedup = SpeedupStats {
            mean: mean(&speedups),
            median: median(&speedups),
            min: speedups.iter().copied().fold(f64::INFINITY, f64::min),
            max: speedups.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };

        let column = |f: fn(&ComparisonRecord) -> f64| -> f64 {
            mean(&records.iter().map(f).collect::<Vec<_>>())
        };

        let mean_baseline_latency = column(|r| r.baseline_latency);
        let mean_speculative_latency = column(|r| r.speculative_latency);

        Ok(Self {
            prompts: records.len(),
            speedup,
            mean_baseline_latency,
            mean_speculative_latency,
            mean_latency_reduction_pct: column(|r| r.latency_reduction_pct),
            mean_baseline_tokens_per_sec: column(|r| r.baseline_tokens_per_sec),
            mean_speculative_tokens_per_sec: column(|r| r.speculative_tokens_per_sec),
            mean_throughput_increase_pct: column(|r| r.throughput_increase_pct),
            business_impact: BusinessImpact::project(
                mean_baseline_latency,
                mean_speculative_latency,
                speedup.mean,
                queries_per_day,
            ),
        })
    }
}

fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

fn median(data: &[f64]) -> f64 {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }

    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}
