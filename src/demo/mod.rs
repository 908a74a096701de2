//! Interactive demo service
//!
//! Owns the lazily constructed generators behind the demo UI and turns their
//! results (or errors) into display strings.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::inference::{DecodingMode, EngineGenerator, Generator, InferenceError};
use crate::storage::settings::HarnessSettings;
use crate::types::result::{ComparisonError, ComparisonMetrics, GenerationResult};

pub const EMPTY_PROMPT_WARNING: &str = "⚠️ Please enter a prompt";

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

/// Builds a generator the first time a mode is used
#[async_trait]
pub trait GeneratorFactory: Send + Sync {
    async fn create(&self, mode: DecodingMode) -> Result<Arc<dyn Generator>, InferenceError>;
}

/// Loads engine-backed generators from the harness settings
pub struct EngineFactory {
    settings: HarnessSettings,
}

impl EngineFactory {
    pub fn new(settings: HarnessSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl GeneratorFactory for EngineFactory {
    async fn create(&self, mode: DecodingMode) -> Result<Arc<dyn Generator>, InferenceError> {
        let engine = match mode {
            DecodingMode::Baseline => self.settings.baseline.clone(),
            DecodingMode::Speculative => self.settings.speculative.clone(),
        };
        let generator = EngineGenerator::load(engine, self.settings.sampling.clone()).await?;
        Ok(Arc::new(generator))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Pause between the two runs of a side-by-side comparison
    pub pause_between_variants: Duration,
    /// Query volume the comparison report projects savings for
    pub queries_per_day: u64,
}

/// Single-mode output fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SingleInference {
    pub text: String,
    pub latency: String,
    pub throughput: String,
    pub info: String,
}

impl SingleInference {
    fn message(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Side-by-side output fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideBySide {
    pub baseline_text: String,
    pub speculative_text: String,
    /// Markdown comparison report, or a warning/error line
    pub report: String,
}

impl SideBySide {
    fn message(report: impl Into<String>) -> Self {
        Self {
            report: report.into(),
            ..Self::default()
        }
    }
}

/// Service holder shared by the demo views
///
/// Each generator is constructed at most once, on first use, and kept until
/// the process exits.
pub struct DemoService {
    factory: Arc<dyn GeneratorFactory>,
    config: DemoConfig,
    baseline: OnceCell<Arc<dyn Generator>>,
    speculative: OnceCell<Arc<dyn Generator>>,
}

impl DemoService {
    pub fn new(factory: Arc<dyn GeneratorFactory>, config: DemoConfig) -> Self {
        Self {
            factory,
            config,
            baseline: OnceCell::new(),
            speculative: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &HarnessSettings) -> Self {
        let config = DemoConfig {
            pause_between_variants: Duration::from_millis(settings.pause_between_variants_ms),
            queries_per_day: settings.demo_queries_per_day,
        };
        Self::new(Arc::new(EngineFactory::new(settings.clone())), config)
    }

    /// Whether the generator for `mode` has been constructed
    pub fn is_loaded(&self, mode: DecodingMode) -> bool {
        self.cell(mode).initialized()
    }

    fn cell(&self, mode: DecodingMode) -> &OnceCell<Arc<dyn Generator>> {
        match mode {
            DecodingMode::Baseline => &self.baseline,
            DecodingMode::Speculative => &self.speculative,
        }
    }

    async fn generator(&self, mode: DecodingMode) -> Result<Arc<dyn Generator>, InferenceError> {
        let generator = self
            .cell(mode)
            .get_or_try_init(|| async {
                tracing::info!("Loading {} generator on first use", mode);
                self.factory.create(mode).await
            })
            .await?;
        Ok(Arc::clone(generator))
    }

    async fn generate(&self, mode: DecodingMode, prompt: &str) -> Result<GenerationResult, InferenceError> {
        self.generator(mode).await?.generate(prompt).await
    }

    /// Run one prompt through the selected mode
    pub async fn single_inference(&self, prompt: &str, mode: DecodingMode) -> SingleInference {
        if prompt.trim().is_empty() {
            return SingleInference::message(EMPTY_PROMPT_WARNING);
        }

        match self.generate(mode, prompt).await {
            Ok(result) => SingleInference {
                latency: format!("⏱️ {:.2} seconds", result.latency),
                throughput: format!("🚀 {:.1} tokens/sec", result.tokens_per_sec),
                info: format!(
                    "📊 {}\n💻 {}\n🔢 {} tokens generated",
                    mode.method(),
                    mode.model_info(),
                    result.tokens
                ),
                text: result.text,
            },
            Err(e) => {
                tracing::error!("{} inference failed: {}", mode, e);
                SingleInference::message(format!("❌ Error: {}", e))
            }
        }
    }

    /// Run one prompt through both modes and compare them
    pub async fn side_by_side(&self, prompt: &str) -> SideBySide {
        if prompt.trim().is_empty() {
            return SideBySide::message(EMPTY_PROMPT_WARNING);
        }

        match self.compare(prompt).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Comparison failed: {}", e);
                SideBySide::message(format!("❌ Error: {}", e))
            }
        }
    }

    async fn compare(&self, prompt: &str) -> Result<SideBySide, DemoError> {
        let head: String = prompt.chars().take(50).collect();

        tracing::info!("Running baseline for: {}...", head);
        let base = self.generate(DecodingMode::Baseline, prompt).await?;

        if !self.config.pause_between_variants.is_zero() {
            tokio::time::sleep(self.config.pause_between_variants).await;
        }

        tracing::info!("Running speculative for: {}...", head);
        let spec = self.generate(DecodingMode::Speculative, prompt).await?;

        let metrics = ComparisonMetrics::between(&base, &spec)?;
        let report = comparison_report(&base, &spec, &metrics, self.config.queries_per_day);

        Ok(SideBySide {
            baseline_text: base.text,
            speculative_text: spec.text,
            report,
        })
    }
}

/// Markdown report for one side-by-side run
pub fn comparison_report(
    base: &GenerationResult,
    spec: &GenerationResult,
    metrics: &ComparisonMetrics,
    queries_per_day: u64,
) -> String {
    let minutes_saved = (base.latency - spec.latency) * queries_per_day as f64 / 60.0;

    format!(
        r#"
## ⚡ Performance Comparison

| Metric | Baseline | Speculative | Improvement |
|--------|----------|-------------|-------------|
| **Latency** | {base_latency:.2}s | {spec_latency:.2}s | **{speedup:.2}x faster** ⚡ |
| **Throughput** | {base_tps:.1} tok/s | {spec_tps:.1} tok/s | **+{gain:.1}%** 📈 |
| **Tokens Generated** | {base_tokens} | {spec_tokens} | Same output length |
| **Latency Reduction** | - | - | **-{reduction:.1}%** 📉 |

---

### 🎯 Key Insights

- **Speed:** Speculative decoding is **{speedup:.2}x faster** with identical quality
- **Efficiency:** Processes **{gain:.1}% more tokens per second**
- **Quality:** Both outputs are equivalent (same model verification)

### 💰 Business Impact

For **{queries} daily queries**:
- Time saved: **{minutes_saved:.1} minutes/day**
- Capacity increase: Serve **{speedup:.1}x more users** with same hardware

---

**Model Configuration:**
- Draft: Qwen2.5-7B-Instruct (fast proposal)
- Target: Qwen2.5-72B-Instruct-AWQ (verification & quality assurance)
"#,
        base_latency = base.latency,
        spec_latency = spec.latency,
        speedup = metrics.speedup,
        base_tps = base.tokens_per_sec,
        spec_tps = spec.tokens_per_sec,
        gain = metrics.throughput_increase_pct,
        base_tokens = base.tokens,
        spec_tokens = spec.tokens,
        reduction = metrics.latency_reduction_pct,
        queries = crate::benchmark::report::group_thousands(queries_per_day),
        minutes_saved = minutes_saved,
    )
}
