//! Benchmark runner
//!
//! Drives an ordered prompt list through the baseline and speculative generators.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::benchmark::report::format_prompt_result;
use crate::benchmark::BenchmarkError;
use crate::inference::Generator;
use crate::types::result::{ComparisonRecord, GenerationResult};

/// What to do when a prompt fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run at the first failure
    #[default]
    Abort,
    /// Record the failure and continue with the next prompt
    Capture,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Pause between the baseline and speculative call for one prompt
    pub pause_between_variants: Duration,
    /// Pause before the next prompt
    pub pause_between_prompts: Duration,
    pub failure_policy: FailurePolicy,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pause_between_variants: Duration::from_millis(500),
            pause_between_prompts: Duration::from_secs(1),
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// Step of a prompt that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Baseline,
    Speculative,
    Comparison,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Baseline => write!(f, "baseline"),
            FailureStage::Speculative => write!(f, "speculative"),
            FailureStage::Comparison => write!(f, "comparison"),
        }
    }
}

/// Failure marker for a prompt that produced no record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptFailure {
    pub prompt_id: usize,
    pub prompt: String,
    pub stage: FailureStage,
    pub error: String,
}

/// Everything a run produced, in prompt order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkRun {
    pub records: Vec<ComparisonRecord>,
    pub failures: Vec<PromptFailure>,
}

pub struct BenchmarkRunner<'a> {
    baseline: &'a dyn Generator,
    speculative: &'a dyn Generator,
    config: RunnerConfig,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(
        baseline: &'a dyn Generator,
        speculative: &'a dyn Generator,
        config: RunnerConfig,
    ) -> Self {
        Self {
            baseline,
            speculative,
            config,
        }
    }

    /// Run every prompt once per variant.
    ///
    /// Requires at least one prompt. Under [`FailurePolicy::Abort`] the first
    /// failure ends the run with that error.
    pub async fn run(&self, prompts: &[&str]) -> Result<BenchmarkRun, BenchmarkError> {
        if prompts.is_empty() {
            return Err(BenchmarkError::EmptyRun);
        }

        let mut run = BenchmarkRun::default();
        let rule = "─".repeat(80);

        for (index, prompt) in prompts.iter().enumerate() {
            let prompt_id = index + 1;
            println!("\n{}", rule);
            println!("PROMPT {}/{}", prompt_id, prompts.len());
            println!("{}", rule);
            println!("📝 {}...", prompt.chars().take(75).collect::<String>());

            match self.run_prompt(prompt_id, prompt).await {
                Ok(record) => {
                    print!("{}", format_prompt_result(&record));
                    run.records.push(record);
                }
                Err((stage, error)) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Capture => {
                        tracing::warn!("Prompt {} failed at {} stage: {}", prompt_id, stage, error);
                        run.failures.push(PromptFailure {
                            prompt_id,
                            prompt: prompt.to_string(),
                            stage,
                            error: error.to_string(),
                        });
                    }
                },
            }

            if prompt_id < prompts.len() {
                pause(self.config.pause_between_prompts).await;
            }
        }

        Ok(run)
    }

    async fn run_prompt(
        &self,
        prompt_id: usize,
        prompt: &str,
    ) -> Result<ComparisonRecord, (FailureStage, BenchmarkError)> {
        let base = self
            .generate(self.baseline, prompt)
            .await
            .map_err(|e| (FailureStage::Baseline, e))?;

        pause(self.config.pause_between_variants).await;

        let spec = self
            .generate(self.speculative, prompt)
            .await
            .map_err(|e| (FailureStage::Speculative, e))?;

        ComparisonRecord::new(prompt_id, prompt, &base, &spec)
            .map_err(|e| (FailureStage::Comparison, e.into()))
    }

    async fn generate(
        &self,
        generator: &dyn Generator,
        prompt: &str,
    ) -> Result<GenerationResult, BenchmarkError> {
        let result = generator.generate(prompt).await?;
        tracing::debug!(
            "{}: {:.3}s, {} tokens, {:.1} tok/s",
            generator.mode(),
            result.latency,
            result.tokens,
            result.tokens_per_sec
        );
        Ok(result)
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        sleep(duration).await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inference::{DecodingMode, InferenceError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Generator returning canned latencies; fails on the calls listed in `fail_on`
    pub(crate) struct FakeGenerator {
        pub mode: DecodingMode,
        pub latency: f64,
        pub tokens: u64,
        pub fail_on: Vec<usize>,
        pub calls: AtomicUsize,
    }

    impl FakeGenerator {
        pub fn new(mode: DecodingMode, latency: f64, tokens: u64) -> Self {
            Self {
                mode,
                latency,
                tokens,
                fail_on: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing_on(mut self, calls: &[usize]) -> Self {
            self.fail_on = calls.to_vec();
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        fn mode(&self) -> DecodingMode {
            self.mode
        }

        async fn generate(&self, prompt: &str) -> Result<GenerationResult, InferenceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_on.contains(&call) {
                return Err(InferenceError::Malformed("simulated engine failure".into()));
            }
            Ok(GenerationResult::new(
                format!("{} reply to {}", self.mode, prompt),
                self.latency,
                self.tokens,
            ))
        }
    }

    fn instant() -> RunnerConfig {
        RunnerConfig {
            pause_between_variants: Duration::ZERO,
            pause_between_prompts: Duration::ZERO,
            failure_policy: FailurePolicy::Abort,
        }
    }

    #[tokio::test]
    async fn test_run_produces_ordered_records() {
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 4.0, 100);
        let runner = BenchmarkRunner::new(&base, &spec, instant());

        let run = runner.run(&["first", "second", "third"]).await.unwrap();
        assert_eq!(run.records.len(), 3);
        assert!(run.failures.is_empty());
        assert_eq!(
            run.records.iter().map(|r| r.prompt_id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(run.records[1].prompt, "second");
        assert_eq!(run.records[0].baseline_output, "baseline reply to first");
        assert!((run.records[0].speedup - 2.5).abs() < 1e-9);
        assert_eq!(base.calls(), 3);
        assert_eq!(spec.calls(), 3);
    }

    #[tokio::test]
    async fn test_empty_prompt_list_rejected() {
        let base = FakeGenerator::new(DecodingMode::Baseline, 1.0, 1);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 1.0, 1);
        let runner = BenchmarkRunner::new(&base, &spec, instant());
        assert!(matches!(runner.run(&[]).await, Err(BenchmarkError::EmptyRun)));
        assert_eq!(base.calls(), 0);
    }

    #[tokio::test]
    async fn test_abort_on_failure() {
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 4.0, 100).failing_on(&[2]);
        let runner = BenchmarkRunner::new(&base, &spec, instant());

        let result = runner.run(&["a", "b", "c"]).await;
        assert!(matches!(result, Err(BenchmarkError::Inference(_))));
        // third prompt never ran
        assert_eq!(base.calls(), 2);
    }

    #[tokio::test]
    async fn test_capture_failures_and_continue() {
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100).failing_on(&[1]);
        // speculative is never called for prompt 1, so its first call belongs to prompt 2
        let spec = FakeGenerator::new(DecodingMode::Speculative, 4.0, 100).failing_on(&[1]);
        let mut config = instant();
        config.failure_policy = FailurePolicy::Capture;
        let runner = BenchmarkRunner::new(&base, &spec, config);

        let run = runner.run(&["a", "b", "c"]).await.unwrap();
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].prompt_id, 3);
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.failures[0].prompt_id, 1);
        assert_eq!(run.failures[0].stage, FailureStage::Baseline);
        assert_eq!(run.failures[1].prompt_id, 2);
        assert_eq!(run.failures[1].stage, FailureStage::Speculative);
        assert_eq!(spec.calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_latency_is_a_comparison_failure() {
        let base = FakeGenerator::new(DecodingMode::Baseline, 10.0, 100);
        let spec = FakeGenerator::new(DecodingMode::Speculative, 0.0, 100);
        let mut config = instant();
        config.failure_policy = FailurePolicy::Capture;
        let runner = BenchmarkRunner::new(&base, &spec, config);

        let run = runner.run(&["a"]).await.unwrap();
        assert!(run.records.is_empty());
        assert_eq!(run.failures[0].stage, FailureStage::Comparison);
    }
}
