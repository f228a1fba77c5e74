//! fixcheck Common - Shared utilities: logging and configuration
//!
//! This crate provides common functionality used across all fixcheck crates.

pub mod config;
pub mod logging;

pub use config::{CheckerConfig, Config, ConfigBuilder};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogFormat};
