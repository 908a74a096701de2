//! Persistent storage
//!
//! This module handles harness settings and model artifacts on disk.

pub mod huggingface;
pub mod settings;

use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine data directory")]
    NoDataDir,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Hub request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Hub returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Invalid remote path: {0}")]
    InvalidPath(String),
    #[error("Download incomplete for {path}: got {got} bytes, expected {expected}")]
    Incomplete { path: String, got: u64, expected: u64 },
}

/// Platform data directory of the harness
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    ProjectDirs::from("dev", "specbench", "specbench")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
