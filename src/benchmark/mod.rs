//! Baseline vs speculative benchmark
//!
//! Runs the fixed prompt set through both generators, aggregates the comparison
//! and persists the reports.

pub mod prompts;
pub mod report;
pub mod runner;
pub mod stats;

use thiserror::Error;

use crate::inference::{EngineGenerator, Generator, InferenceError};
use crate::storage::settings::HarnessSettings;
use crate::system::gpu::detect_gpu;
use crate::types::result::ComparisonError;

pub use report::ReportPaths;
pub use runner::{BenchmarkRun, BenchmarkRunner, FailurePolicy, RunnerConfig};
pub use stats::BenchmarkSummary;

/// Benchmark errors
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("benchmark produced no comparison records")]
    EmptyRun,
    #[error("invalid comparison: {0}")]
    Comparison(#[from] ComparisonError),
    #[error("generation failed: {0}")]
    Inference(#[from] InferenceError),
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outcome of a full benchmark
#[derive(Debug)]
pub struct BenchmarkOutcome {
    pub run: BenchmarkRun,
    pub summary: BenchmarkSummary,
    pub reports: ReportPaths,
}

/// Load both engines, run every demo prompt, print and persist the results.
pub async fn run_comprehensive_benchmark(
    settings: &HarnessSettings,
    failure_policy: FailurePolicy,
) -> Result<BenchmarkOutcome, BenchmarkError> {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!("🎯 QWEN 2.5 SPECULATIVE DECODING BENCHMARK");
    println!("{}", rule);

    let gpu = detect_gpu();
    if gpu.is_available {
        tracing::info!(
            "GPU: {} ({:.1} GB total, {:.1} GB used)",
            gpu.name,
            gpu.vram_total_mb as f64 / 1024.0,
            gpu.vram_used_mb as f64 / 1024.0
        );
    } else {
        tracing::warn!("No GPU detected, the engine may fail to load");
    }
    tracing::warn!(
        "Both engines stay resident for the whole run; ensure enough GPU memory is free"
    );

    println!("\n[1/3] Loading Baseline Generator (Qwen2.5-72B-AWQ)...");
    let baseline =
        EngineGenerator::load(settings.baseline.clone(), settings.sampling.clone()).await?;

    println!("\n[2/3] Loading Speculative Generator (Qwen2.5-7B → Qwen2.5-72B-AWQ)...");
    let speculative =
        EngineGenerator::load(settings.speculative.clone(), settings.sampling.clone()).await?;

    run_benchmark(
        &baseline,
        &speculative,
        prompts::DEMO_PROMPTS,
        settings,
        failure_policy,
    )
    .await
}

/// Run `prompts` through already loaded generators, print and persist the results.
pub async fn run_benchmark(
    baseline: &dyn Generator,
    speculative: &dyn Generator,
    prompts: &[&str],
    settings: &HarnessSettings,
    failure_policy: FailurePolicy,
) -> Result<BenchmarkOutcome, BenchmarkError> {
    println!("\n[3/3] Running Benchmarks on {} prompts...", prompts.len());
    println!("{}", "=".repeat(80));

    let config = RunnerConfig {
        failure_policy,
        ..settings.runner_config()
    };
    let run = BenchmarkRunner::new(baseline, speculative, config)
        .run(prompts)
        .await?;

    let summary = BenchmarkSummary::from_records(&run.records, settings.queries_per_day)?;
    print!("{}", report::format_console_summary(&summary, &run.failures));

    let reports = report::write_reports(&run, &summary, &settings.output_dir)?;
    println!("\n📁 Results saved:");
    println!("   CSV: {}", reports.csv.display());
    println!("   JSON: {}", reports.json.display());
    println!("   SUMMARY: {}", reports.summary.display());
    println!("\n✅ Benchmark complete!");

    Ok(BenchmarkOutcome {
        run,
        summary,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::runner::tests::FakeGenerator;
    use crate::inference::DecodingMode;

    fn instant_settings(output_dir: &std::path::Path) -> HarnessSettings {
        let mut settings = HarnessSettings::default();
        settings.pause_between_variants_ms = 0;
        settings.pause_between_prompts_ms = 0;
        settings.output_dir = output_dir.to_path_buf();
        settings
    }

    #[tokio::test]
    async fn test_run_benchmark_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let settings = instant_settings(&dir.path().join("reports"));
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 4.0, 100);

        let outcome = run_benchmark(
            &base,
            &spec,
            prompts::DEMO_PROMPTS,
            &settings,
            FailurePolicy::Abort,
        )
        .await
        .unwrap();

        assert_eq!(outcome.run.records.len(), prompts::DEMO_PROMPTS.len());
        assert_eq!(outcome.summary.prompts, prompts::DEMO_PROMPTS.len());
        assert!((outcome.summary.speedup.mean - 2.5).abs() < 1e-9);
        assert_eq!(base.calls(), prompts::DEMO_PROMPTS.len());

        let csv = std::fs::read_to_string(&outcome.reports.csv).unwrap();
        assert_eq!(csv.lines().count(), prompts::DEMO_PROMPTS.len() + 1);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.reports.json).unwrap()).unwrap();
        assert_eq!(
            json["records"].as_array().unwrap().len(),
            prompts::DEMO_PROMPTS.len()
        );
        assert!(json["failures"].as_array().unwrap().is_empty());
        assert!(outcome.reports.summary.exists());
    }

    #[tokio::test]
    async fn test_run_benchmark_keeps_going_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        let settings = instant_settings(dir.path());
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100).failing_on(&[2]);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 5.0, 100);

        let outcome = run_benchmark(
            &base,
            &spec,
            &["a", "b", "c"],
            &settings,
            FailurePolicy::Capture,
        )
        .await
        .unwrap();

        assert_eq!(outcome.run.records.len(), 2);
        assert_eq!(outcome.summary.prompts, 2);
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&outcome.reports.json).unwrap()).unwrap();
        assert_eq!(json["failures"][0]["prompt_id"], 2);
        assert_eq!(json["failures"][0]["stage"], "baseline");
    }

    #[tokio::test]
    async fn test_run_benchmark_with_no_records_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = instant_settings(dir.path());
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100).failing_on(&[1]);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 5.0, 100);

        let result =
            run_benchmark(&base, &spec, &["a"], &settings, FailurePolicy::Capture).await;
        assert!(matches!(result, Err(BenchmarkError::EmptyRun)));
        assert!(!ReportPaths::in_dir(dir.path()).json.exists());
    }
}
