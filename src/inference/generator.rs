//! Engine-backed generator
//!
//! Baseline and speculative adapters share this implementation; only the engine
//! configuration they are loaded with differs.

use async_trait::async_trait;
use std::time::Instant;

use crate::inference::client::CompletionClient;
use crate::inference::engine::EngineHandle;
use crate::inference::{DecodingMode, Generator, InferenceError};
use crate::types::config::{EngineConfig, SamplingConfig};
use crate::types::message::format_chat_prompt;
use crate::types::result::GenerationResult;

pub struct EngineGenerator {
    mode: DecodingMode,
    sampling: SamplingConfig,
    client: CompletionClient,
    // Held for its lifetime: dropping it stops a spawned engine
    _engine: EngineHandle,
}

impl EngineGenerator {
    /// Load the engine. This is the expensive, blocking step (minutes for large models).
    pub async fn load(
        engine: EngineConfig,
        sampling: SamplingConfig,
    ) -> Result<Self, InferenceError> {
        sampling.validate()?;

        let mode = if engine.is_speculative() {
            DecodingMode::Speculative
        } else {
            DecodingMode::Baseline
        };

        tracing::info!("Loading {} generator ({})", mode, mode.model_info());
        if let Some(spec) = &engine.speculative {
            tracing::info!(
                "Draft model: {}, speculative tokens: {}",
                spec.draft_model_path.display(),
                spec.num_speculative_tokens
            );
        }
        tracing::info!("This may take a few minutes...");

        let handle = EngineHandle::start(&engine).await?;
        let client = CompletionClient::new(handle.base_url(), engine.served_model_name.clone());

        tracing::info!(
            "{} generator loaded ({} engine at {})",
            mode,
            if handle.is_spawned() {
                "spawned"
            } else {
                "attached"
            },
            handle.base_url()
        );

        Ok(Self {
            mode,
            sampling,
            client,
            _engine: handle,
        })
    }
}

#[async_trait]
impl Generator for EngineGenerator {
    fn mode(&self) -> DecodingMode {
        self.mode
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, InferenceError> {
        let formatted = format_chat_prompt(prompt);

        let start = Instant::now();
        let completion = self.client.complete(&formatted, &self.sampling).await?;
        let latency = start.elapsed().as_secs_f64();

        tracing::debug!(
            "{} generated {} tokens in {:.3}s",
            self.mode,
            completion.tokens,
            latency
        );

        Ok(GenerationResult::new(
            completion.text.trim(),
            latency,
            completion.tokens,
        ))
    }
}
