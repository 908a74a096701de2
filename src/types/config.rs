//! Configuration types
//!
//! Engine and sampling configuration structures passed to the serving engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Invalid configuration values
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("model path must not be empty")]
    EmptyModelPath,
    #[error("gpu memory utilization must be in (0, 1], got {0}")]
    MemoryUtilization(f32),
    #[error("max model length must be positive")]
    ZeroContextLength,
    #[error("tensor parallel size must be positive")]
    ZeroTensorParallel,
    #[error("speculative token count must be at least 1")]
    ZeroSpeculativeTokens,
    #[error("draft model path must not be empty")]
    EmptyDraftPath,
    #[error("max tokens must be positive")]
    ZeroMaxTokens,
    #[error("invalid sampling parameter: {0}")]
    Sampling(String),
}

/// Weight quantization scheme understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quantization {
    Awq,
    Gptq,
    Fp8,
    None,
}

impl Quantization {
    /// Engine identifier, `None` when no flag should be passed
    pub fn as_engine_arg(&self) -> Option<&'static str> {
        match self {
            Quantization::Awq => Some("awq"),
            Quantization::Gptq => Some("gptq"),
            Quantization::Fp8 => Some("fp8"),
            Quantization::None => None,
        }
    }
}

/// How the harness reaches the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchMode {
    /// Spawn `<binary> serve ...` and wait for it to become healthy
    Spawn {
        binary: String,
        host: String,
        port: u16,
    },
    /// Use an engine that is already serving at `base_url`
    Attach { base_url: String },
}

impl LaunchMode {
    pub fn base_url(&self) -> String {
        match self {
            LaunchMode::Spawn { host, port, .. } => {
                let host = if host == "0.0.0.0" { "127.0.0.1" } else { host };
                format!("http://{}:{}", host, port)
            }
            LaunchMode::Attach { base_url } => base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Draft model settings for speculative decoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeculativeConfig {
    /// Local path of the draft model weights
    pub draft_model_path: PathBuf,
    /// Tokens proposed by the draft model per verification round
    pub num_speculative_tokens: u32,
}

impl Default for SpeculativeConfig {
    fn default() -> Self {
        Self {
            draft_model_path: PathBuf::from("./models/draft"),
            num_speculative_tokens: 5,
        }
    }
}

/// Everything the serving engine is loaded with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Local path of the target model weights
    pub model_path: PathBuf,
    /// Name the engine serves the model under
    pub served_model_name: String,
    pub quantization: Quantization,
    /// Weight dtype, "auto" lets the engine decide
    pub dtype: String,
    /// Maximum context length in tokens
    pub max_model_len: u32,
    /// Fraction of device memory the engine may claim
    pub gpu_memory_utilization: f32,
    pub tensor_parallel_size: u32,
    pub trust_remote_code: bool,
    /// Present only for the speculative variant
    #[serde(default)]
    pub speculative: Option<SpeculativeConfig>,
    pub launch: LaunchMode,
    /// Upper bound on waiting for the engine to report healthy
    pub load_timeout_secs: u64,
}

impl EngineConfig {
    /// Single large quantized model, sequential decoding
    pub fn baseline() -> Self {
        Self {
            model_path: PathBuf::from("./models/target"),
            served_model_name: "qwen2.5-72b-awq".to_string(),
            quantization: Quantization::Awq,
            dtype: "auto".to_string(),
            max_model_len: 2048,
            gpu_memory_utilization: 0.75,
            tensor_parallel_size: 1,
            trust_remote_code: true,
            speculative: None,
            launch: LaunchMode::Spawn {
                binary: "vllm".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8100,
            },
            load_timeout_secs: 900,
        }
    }

    /// Same target model paired with the draft model
    pub fn speculative() -> Self {
        Self {
            served_model_name: "qwen2.5-72b-awq-speculative".to_string(),
            speculative: Some(SpeculativeConfig::default()),
            launch: LaunchMode::Spawn {
                binary: "vllm".to_string(),
                host: "127.0.0.1".to_string(),
                port: 8101,
            },
            ..Self::baseline()
        }
    }

    pub fn is_speculative(&self) -> bool {
        self.speculative.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyModelPath);
        }
        if !(self.gpu_memory_utilization > 0.0 && self.gpu_memory_utilization <= 1.0) {
            return Err(ConfigError::MemoryUtilization(self.gpu_memory_utilization));
        }
        if self.max_model_len == 0 {
            return Err(ConfigError::ZeroContextLength);
        }
        if self.tensor_parallel_size == 0 {
            return Err(ConfigError::ZeroTensorParallel);
        }
        if let Some(spec) = &self.speculative {
            if spec.draft_model_path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDraftPath);
            }
            if spec.num_speculative_tokens == 0 {
                return Err(ConfigError::ZeroSpeculativeTokens);
            }
        }
        Ok(())
    }

    /// Arguments for `vllm serve`, minus the binary itself
    pub fn serve_args(&self) -> Vec<String> {
        let mut args = vec![
            "serve".to_string(),
            self.model_path.to_string_lossy().to_string(),
            "--served-model-name".to_string(),
            self.served_model_name.clone(),
            "--tensor-parallel-size".to_string(),
            self.tensor_parallel_size.to_string(),
            "--gpu-memory-utilization".to_string(),
            self.gpu_memory_utilization.to_string(),
            "--max-model-len".to_string(),
            self.max_model_len.to_string(),
            "--dtype".to_string(),
            self.dtype.clone(),
        ];

        if let LaunchMode::Spawn { host, port, .. } = &self.launch {
            args.push("--host".to_string());
            args.push(host.clone());
            args.push("--port".to_string());
            args.push(port.to_string());
        }

        if let Some(quant) = self.quantization.as_engine_arg() {
            args.push("--quantization".to_string());
            args.push(quant.to_string());
        }

        if self.trust_remote_code {
            args.push("--trust-remote-code".to_string());
        }

        if let Some(spec) = &self.speculative {
            let spec_json = serde_json::json!({
                "model": spec.draft_model_path.to_string_lossy(),
                "num_speculative_tokens": spec.num_speculative_tokens,
            });
            args.push("--speculative-config".to_string());
            args.push(spec_json.to_string());
        }

        args
    }
}

/// Sampling settings shared by both variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub stop: Vec<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 256,
            stop: vec!["<|endoftext|>".to_string(), "<|im_end|>".to_string()],
        }
    }
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tokens == 0 {
            return Err(ConfigError::ZeroMaxTokens);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Sampling(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(ConfigError::Sampling(format!(
                "top_p {} outside (0, 1]",
                self.top_p
            )));
        }
        Ok(())
    }
}
