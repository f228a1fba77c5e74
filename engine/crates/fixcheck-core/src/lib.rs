//! fixcheck Core - Advisory model, identifiers, capability traits, and error handling
//!
//! This crate provides the core abstractions used throughout fixcheck:
//! - `AdvisoryRecord` / `AdvisoryCollection`: the security data being indexed
//! - `PackageIdentifier` / `Cpe`: parsed package and platform identifiers
//! - `PackageParser`, `PlatformParser`, `OracleFactory`: injected capabilities
//! - `DiagnosticSink`: side channel for non-fatal build diagnostics

pub mod advisory;
pub mod capability;
pub mod error;
pub mod identifier;

// Re-export commonly used types at crate root
pub use advisory::{AdvisoryCollection, AdvisoryRecord, PackageState, ReleaseFix};
pub use capability::{
    ApplicabilityOracle, Diagnostic, DiagnosticSink, OracleFactory, PackageParser, PlatformParser,
};
pub use error::{Error, Result};
pub use identifier::{
    Cpe, CpeParseError, CpePart, PackageIdentifier, PackageParseError, PlatformIdentifier,
};
