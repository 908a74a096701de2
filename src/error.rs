//! Error types for specbench.

use thiserror::Error;

use crate::benchmark::BenchmarkError;
use crate::inference::InferenceError;
use crate::storage::StorageError;
use crate::types::config::ConfigError;

/// Result type alias for specbench operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error of the command line.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Benchmark(#[from] BenchmarkError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Some model downloads failed; the rest completed.
    #[error("{failed} of {total} model downloads failed")]
    Download { failed: usize, total: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
