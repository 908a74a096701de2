//! Benchmark records
//!
//! Results of single generation calls and the per-prompt comparison derived from a pair of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of prompt characters kept in a record preview
pub const PREVIEW_CHARS: usize = 60;

/// Outcome of one `generate` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
    /// Wall-clock seconds spent in the engine call
    pub latency: f64,
    /// Generated token count
    pub tokens: u64,
    /// `tokens / latency`, or 0 when latency is not positive
    pub tokens_per_sec: f64,
}

impl GenerationResult {
    /// Build a result and derive its throughput.
    ///
    /// A latency of zero or below yields `tokens_per_sec == 0.0` instead of
    /// dividing by zero. This is a guard, not a measurement floor.
    pub fn new(text: impl Into<String>, latency: f64, tokens: u64) -> Self {
        let tokens_per_sec = if latency > 0.0 {
            tokens as f64 / latency
        } else {
            0.0
        };
        Self {
            text: text.into(),
            latency,
            tokens,
            tokens_per_sec,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ComparisonError {
    #[error("latencies must be positive (baseline {baseline}s, speculative {speculative}s)")]
    NonPositiveLatency { baseline: f64, speculative: f64 },
}

/// Derived speed metrics of speculative over baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    pub speedup: f64,
    pub latency_reduction_pct: f64,
    pub throughput_increase_pct: f64,
}

impl ComparisonMetrics {
    /// Compare two results. Both latencies must be strictly positive.
    pub fn between(
        baseline: &GenerationResult,
        speculative: &GenerationResult,
    ) -> Result<Self, ComparisonError> {
        if !(baseline.latency > 0.0 && speculative.latency > 0.0) {
            return Err(ComparisonError::NonPositiveLatency {
                baseline: baseline.latency,
                speculative: speculative.latency,
            });
        }

        Ok(Self {
            speedup: baseline.latency / speculative.latency,
            latency_reduction_pct: (baseline.latency - speculative.latency) / baseline.latency
                * 100.0,
            throughput_increase_pct: throughput_increase_pct(
                baseline.tokens_per_sec,
                speculative.tokens_per_sec,
            ),
        })
    }
}

/// Percentage throughput gain. Non-finite when `baseline_tps` is zero.
pub fn throughput_increase_pct(baseline_tps: f64, speculative_tps: f64) -> f64 {
    (speculative_tps - baseline_tps) / baseline_tps * 100.0
}

/// Per-prompt comparison of baseline against speculative decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub prompt_id: usize,
    pub prompt: String,
    pub prompt_preview: String,
    pub baseline_latency: f64,
    pub baseline_tokens_per_sec: f64,
    pub baseline_tokens: u64,
    pub speculative_latency: f64,
    pub speculative_tokens_per_sec: f64,
    pub speculative_tokens: u64,
    pub speedup: f64,
    pub latency_reduction_pct: f64,
    pub throughput_increase_pct: f64,
    pub baseline_output: String,
    pub speculative_output: String,
}

impl ComparisonRecord {
    pub fn new(
        prompt_id: usize,
        prompt: &str,
        baseline: &GenerationResult,
        speculative: &GenerationResult,
    ) -> Result<Self, ComparisonError> {
        let metrics = ComparisonMetrics::between(baseline, speculative)?;

        Ok(Self {
            prompt_id,
            prompt: prompt.to_string(),
            prompt_preview: preview(prompt),
            baseline_latency: baseline.latency,
            baseline_tokens_per_sec: baseline.tokens_per_sec,
            baseline_tokens: baseline.tokens,
            speculative_latency: speculative.latency,
            speculative_tokens_per_sec: speculative.tokens_per_sec,
            speculative_tokens: speculative.tokens,
            speedup: metrics.speedup,
            latency_reduction_pct: metrics.latency_reduction_pct,
            throughput_increase_pct: metrics.throughput_increase_pct,
            baseline_output: baseline.text.clone(),
            speculative_output: speculative.text.clone(),
        })
    }
}

/// First [`PREVIEW_CHARS`] characters of a prompt followed by `...`
pub fn preview(prompt: &str) -> String {
    let head: String = prompt.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}
