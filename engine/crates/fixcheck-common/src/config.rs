//! Configuration management for fixcheck components

use crate::logging::{LogConfig, LogFormat};
use fixcheck_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Release-fix checker settings
    #[serde(default)]
    pub checker: CheckerConfig,
}

impl Config {
    /// Load configuration from a TOML file. An unreadable file is an `Io` error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (FIXCHECK_ prefix)
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = var("FIXCHECK_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = var("FIXCHECK_LOG_FORMAT") {
            self.logging.format = val;
        }
        // comma separated
        if let Some(val) = var("FIXCHECK_INAPPLICABLE_STATES") {
            self.checker.inapplicable_states = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        self
    }

    /// Logging setup derived from the `[logging]` section
    pub fn log_config(&self) -> Result<LogConfig> {
        let format: LogFormat = self.logging.format.parse().map_err(Error::Configuration)?;
        Ok(LogConfig::new().level(self.logging.level.clone()).format(format))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Settings for the release-fix applicability checker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Package-state fix states that mark an advisory as not applicable
    #[serde(default = "default_inapplicable_states")]
    pub inapplicable_states: Vec<String>,
}

fn default_inapplicable_states() -> Vec<String> {
    vec![String::from("Not affected")]
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            inapplicable_states: default_inapplicable_states(),
        }
    }
}

impl CheckerConfig {
    /// Case-insensitive lookup of a fix state
    pub fn is_inapplicable_state(&self, state: &str) -> bool {
        self.inapplicable_states
            .iter()
            .any(|s| s.eq_ignore_ascii_case(state.trim()))
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn log_format(mut self, format: impl Into<String>) -> Self {
        self.config.logging.format = format.into();
        self
    }

    pub fn inapplicable_state(mut self, state: impl Into<String>) -> Self {
        self.config.checker.inapplicable_states.push(state.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
