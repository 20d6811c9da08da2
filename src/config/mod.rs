//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, thresholds, host and zone lists)
//! - The library `Config`
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, FailOn, LogFormat, LogLevel, Opt, OutputFormat};
