//! LLM inference adapters
//!
//! This module wraps the external serving engine behind a uniform `generate` contract.
//! The engine itself (decoding, KV cache, speculative verification) is opaque.

pub mod client;
pub mod engine;
pub mod generator;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::config::ConfigError;
use crate::types::result::GenerationResult;

pub use generator::EngineGenerator;

/// Inference errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to start engine: {0}")]
    Spawn(String),
    #[error("Engine exited during startup: {0}")]
    EngineExited(String),
    #[error("Engine did not become healthy within {0}s")]
    LoadTimeout(u64),
    #[error("Engine unreachable at {0}")]
    Unreachable(String),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Engine returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed engine response: {0}")]
    Malformed(String),
}

/// Decoding strategy of a generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodingMode {
    /// Target model alone, one token per forward pass
    Baseline,
    /// Draft model proposes, target model verifies
    Speculative,
}

impl DecodingMode {
    /// Selector label shown in the demo
    pub fn label(&self) -> &'static str {
        match self {
            DecodingMode::Baseline => "Baseline (72B-AWQ Only)",
            DecodingMode::Speculative => "Speculative (7B→72B-AWQ)",
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            DecodingMode::Baseline => "Sequential Decoding (Standard)",
            DecodingMode::Speculative => "Speculative Decoding (7B→72B-AWQ)",
        }
    }

    pub fn model_info(&self) -> &'static str {
        match self {
            DecodingMode::Baseline => "Qwen2.5-72B-AWQ",
            DecodingMode::Speculative => "Qwen2.5-7B (draft) + Qwen2.5-72B-AWQ (verify)",
        }
    }
}

impl std::fmt::Display for DecodingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodingMode::Baseline => write!(f, "baseline"),
            DecodingMode::Speculative => write!(f, "speculative"),
        }
    }
}

/// Uniform generation contract over a loaded engine
#[async_trait]
pub trait Generator: Send + Sync {
    fn mode(&self) -> DecodingMode;

    /// Generate a reply to raw prompt content.
    ///
    /// Engine failures are returned to the caller unchanged.
    async fn generate(&self, prompt: &str) -> Result<GenerationResult, InferenceError>;
}
