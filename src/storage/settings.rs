//! Settings storage
//!
//! Manages persistence of engine, sampling and benchmark settings.

use crate::benchmark::runner::RunnerConfig;
use crate::storage::huggingface::{DRAFT_DIR, TARGET_DIR};
use crate::storage::{get_data_dir, StorageError};
use crate::types::config::{EngineConfig, SamplingConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Harness settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSettings {
    /// Engine configuration of the sequential variant
    pub baseline: EngineConfig,
    /// Engine configuration of the draft + target variant
    pub speculative: EngineConfig,
    /// Sampling shared by both variants
    pub sampling: SamplingConfig,
    /// Root directory model artifacts are downloaded into
    ///
    /// The engines load their weights from `draft` and `target` below it.
    pub models_dir: PathBuf,
    /// Directory benchmark reports are written to
    pub output_dir: PathBuf,
    /// Query volume used by the benchmark's business impact projection
    #[serde(default = "default_queries_per_day")]
    pub queries_per_day: u64,
    /// Query volume used by the demo's comparison report
    #[serde(default = "default_demo_queries_per_day")]
    pub demo_queries_per_day: u64,
    #[serde(default = "default_pause_between_variants_ms")]
    pub pause_between_variants_ms: u64,
    #[serde(default = "default_pause_between_prompts_ms")]
    pub pause_between_prompts_ms: u64,
}

fn default_queries_per_day() -> u64 {
    1_000_000
}

fn default_demo_queries_per_day() -> u64 {
    1_000
}

fn default_pause_between_variants_ms() -> u64 {
    500
}

fn default_pause_between_prompts_ms() -> u64 {
    1_000
}

impl Default for HarnessSettings {
    fn default() -> Self {
        let mut settings = Self {
            baseline: EngineConfig::baseline(),
            speculative: EngineConfig::speculative(),
            sampling: SamplingConfig::default(),
            models_dir: PathBuf::new(),
            output_dir: PathBuf::from("."),
            queries_per_day: default_queries_per_day(),
            demo_queries_per_day: default_demo_queries_per_day(),
            pause_between_variants_ms: default_pause_between_variants_ms(),
            pause_between_prompts_ms: default_pause_between_prompts_ms(),
        };
        settings.set_models_dir(PathBuf::from("./models"));
        settings
    }
}

impl HarnessSettings {
    /// Point the downloader and both engines at `dir`
    pub fn set_models_dir(&mut self, dir: PathBuf) {
        let target = dir.join(TARGET_DIR);
        let draft = dir.join(DRAFT_DIR);

        for engine in [&mut self.baseline, &mut self.speculative] {
            engine.model_path = target.clone();
            if let Some(spec) = engine.speculative.as_mut() {
                spec.draft_model_path = draft.clone();
            }
        }
        self.models_dir = dir;
    }

    /// Validate settings values
    ///
    /// Clamps out-of-range values back into the range the engine accepts.
    pub fn validate(&mut self) {
        for engine in [&mut self.baseline, &mut self.speculative] {
            if !(engine.gpu_memory_utilization > 0.0) {
                engine.gpu_memory_utilization = 0.75;
            }
            engine.gpu_memory_utilization = engine.gpu_memory_utilization.min(1.0);

            if engine.max_model_len == 0 {
                engine.max_model_len = 2048;
            }
            if engine.tensor_parallel_size == 0 {
                engine.tensor_parallel_size = 1;
            }
            if let Some(spec) = engine.speculative.as_mut() {
                spec.num_speculative_tokens = spec.num_speculative_tokens.max(1);
            }
        }

        if self.speculative.speculative.is_none() {
            tracing::warn!("Speculative engine has no draft model configured, using defaults");
            self.speculative.speculative = EngineConfig::speculative().speculative;
        }
        if self.baseline.speculative.is_some() {
            tracing::warn!("Baseline engine must not use a draft model, removing it");
            self.baseline.speculative = None;
        }

        // Engines load what the downloader mirrored
        self.set_models_dir(self.models_dir.clone());

        self.sampling.temperature = self.sampling.temperature.clamp(0.0, 2.0);
        if !(self.sampling.top_p > 0.0) {
            self.sampling.top_p = 0.9;
        }
        self.sampling.top_p = self.sampling.top_p.min(1.0);

        // Output can't exceed the smaller context window
        let context = self.baseline.max_model_len.min(self.speculative.max_model_len);
        self.sampling.max_tokens = self.sampling.max_tokens.clamp(1, context);

        if self.queries_per_day == 0 {
            self.queries_per_day = default_queries_per_day();
        }
        if self.demo_queries_per_day == 0 {
            self.demo_queries_per_day = default_demo_queries_per_day();
        }
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            pause_between_variants: Duration::from_millis(self.pause_between_variants_ms),
            pause_between_prompts: Duration::from_millis(self.pause_between_prompts_ms),
            ..RunnerConfig::default()
        }
    }
}

/// Get the default settings file path
pub fn get_settings_path() -> Result<PathBuf, StorageError> {
    Ok(get_data_dir()?.join("settings.json"))
}

/// Load settings from `path`, or from the data directory when `None`
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings(path: Option<&Path>) -> HarnessSettings {
    match load_settings_internal(path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            HarnessSettings::default()
        }
    }
}

/// Internal settings loading with error propagation
fn load_settings_internal(path: Option<&Path>) -> Result<HarnessSettings, StorageError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(HarnessSettings::default());
    }

    let json = fs::read_to_string(&path)?;
    let mut settings: HarnessSettings = serde_json::from_str(&json)?;

    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings to `path`, or to the data directory when `None`
pub fn save_settings(
    settings: &HarnessSettings,
    path: Option<&Path>,
) -> Result<PathBuf, StorageError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => get_settings_path()?,
    };

    // Ensure the parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(&path, json)?;

    tracing::debug!("Saved settings to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::huggingface::default_artifacts;

    #[test]
    fn test_default_settings() {
        let settings = HarnessSettings::default();
        assert_eq!(settings.sampling.temperature, 0.7);
        assert_eq!(settings.sampling.top_p, 0.9);
        assert_eq!(settings.sampling.max_tokens, 256);
        assert_eq!(settings.queries_per_day, 1_000_000);
        assert!(settings.speculative.is_speculative());
        assert!(!settings.baseline.is_speculative());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = HarnessSettings::default();

        settings.sampling.temperature = 5.0;
        settings.validate();
        assert_eq!(settings.sampling.temperature, 2.0);

        settings.sampling.top_p = 0.0;
        settings.validate();
        assert_eq!(settings.sampling.top_p, 0.9);

        settings.sampling.max_tokens = 100_000;
        settings.validate();
        assert_eq!(settings.sampling.max_tokens, 2048);

        settings.baseline.gpu_memory_utilization = 3.0;
        settings.validate();
        assert_eq!(settings.baseline.gpu_memory_utilization, 1.0);

        settings.speculative.speculative = None;
        settings.validate();
        assert!(settings.speculative.is_speculative());

        settings.baseline.speculative = EngineConfig::speculative().speculative;
        settings.validate();
        assert!(!settings.baseline.is_speculative());

        assert!(settings.baseline.validate().is_ok());
        assert!(settings.speculative.validate().is_ok());
    }

    #[test]
    fn test_settings_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = HarnessSettings::default();
        settings.queries_per_day = 42;
        settings.output_dir = PathBuf::from("/tmp/reports");
        save_settings(&settings, Some(&path)).unwrap();

        let loaded = load_settings(Some(&path));
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings(Some(&dir.path().join("absent.json")));
        assert_eq!(loaded, HarnessSettings::default());
    }

    #[test]
    fn test_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(Some(&path)), HarnessSettings::default());
    }

    #[test]
    fn test_engines_load_downloaded_artifacts() {
        let settings = HarnessSettings::default();
        let artifacts = default_artifacts(&settings.models_dir);
        let draft = &settings.speculative.speculative.as_ref().unwrap().draft_model_path;
        assert_eq!(artifacts[0].local_dir, *draft);
        assert_eq!(artifacts[1].local_dir, settings.baseline.model_path);
        assert_eq!(artifacts[1].local_dir, settings.speculative.model_path);

        let mut moved = HarnessSettings::default();
        moved.set_models_dir(PathBuf::from("/data/models"));
        let artifacts = default_artifacts(&moved.models_dir);
        let draft = &moved.speculative.speculative.as_ref().unwrap().draft_model_path;
        assert_eq!(*draft, PathBuf::from("/data/models/draft"));
        assert_eq!(artifacts[0].local_dir, *draft);
        assert_eq!(artifacts[1].local_dir, moved.baseline.model_path);
        assert_eq!(artifacts[1].local_dir, moved.speculative.model_path);
    }

    #[test]
    fn test_models_dir_from_file_reaches_engines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut edited = serde_json::to_value(HarnessSettings::default()).unwrap();
        edited["models_dir"] = serde_json::json!("/data/models");
        fs::write(&path, edited.to_string()).unwrap();

        let loaded = load_settings(Some(&path));
        assert_eq!(loaded.models_dir, PathBuf::from("/data/models"));
        assert_eq!(loaded.baseline.model_path, PathBuf::from("/data/models/target"));
        assert_eq!(
            default_artifacts(&loaded.models_dir)[1].local_dir,
            loaded.baseline.model_path
        );
    }

    #[test]
    fn test_runner_config_from_settings() {
        let mut settings = HarnessSettings::default();
        settings.pause_between_variants_ms = 0;
        settings.pause_between_prompts_ms = 250;
        let config = settings.runner_config();
        assert!(config.pause_between_variants.is_zero());
        assert_eq!(config.pause_between_prompts, Duration::from_millis(250));
    }
}
