//! Shared type definitions
//!
//! This module contains the configuration, template and record types used across the harness.

pub mod config;
pub mod message;
pub mod result;
