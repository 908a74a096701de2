//! specbench library
//!
//! Baseline vs speculative decoding benchmark and demo harness for an external
//! LLM serving engine.

pub mod app;
pub mod benchmark;
pub mod demo;
pub mod error;
pub mod inference;
pub mod logging;
pub mod storage;
pub mod system;
pub mod types;
pub mod ui;

pub use error::{Error, Result};
