//! Error types for fixcheck

use thiserror::Error;

/// Result type alias using fixcheck Error
pub type Result<T> = std::result::Result<T, Error>;

/// fixcheck error types
#[derive(Error, Debug)]
pub enum Error {
    // === Resolution Errors ===
    #[error("Parse error: can't parse {kind} {input:?}: {message}")]
    Parse {
        kind: &'static str,
        input: String,
        message: String,
    },

    #[error("Oracle construction failed: {0}")]
    Construction(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a parse error for a distribution identifier
    pub fn distro(input: &str, err: impl std::fmt::Display) -> Self {
        Error::Parse {
            kind: "distro cpe",
            input: input.to_string(),
            message: err.to_string(),
        }
    }

    /// Build a parse error for a package specifier
    pub fn package(input: &str, err: impl std::fmt::Display) -> Self {
        Error::Parse {
            kind: "package name",
            input: input.to_string(),
            message: err.to_string(),
        }
    }

    /// Check if this error was caused by malformed caller input
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::Parse { .. })
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "PARSE_ERROR",
            Error::Construction(_) => "CONSTRUCTION_ERROR",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
