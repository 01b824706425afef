//! # CIVET Common Library
//!
//! Shared code for CIVET services including:
//! - Error types
//! - Configuration loading (priors, allowlist, thresholds, timeouts)
//! - Logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::VerifyConfig;
pub use error::{Error, Result};
