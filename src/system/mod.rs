//! System utilities
//!
//! This module provides system-level functionality like GPU detection.

pub mod gpu;
