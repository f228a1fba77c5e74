//! Capability traits consumed by the index builder and resolver
//!
//! Parsers, the applicability oracle and the diagnostic side channel are all
//! injected so resolution logic can run against fakes.

use crate::advisory::AdvisoryCollection;
use crate::error::Result;
use crate::identifier::{CpeParseError, PackageIdentifier, PackageParseError, PlatformIdentifier};

/// Parses a full package specifier (e.g. `bash-4.4-23.el8`)
pub trait PackageParser: Send + Sync {
    fn parse(&self, spec: &str) -> std::result::Result<PackageIdentifier, PackageParseError>;
}

/// Parses a distribution identifier (e.g. `cpe:/o:redhat:enterprise_linux:8`)
pub trait PlatformParser: Send + Sync {
    fn parse(&self, spec: &str) -> std::result::Result<PlatformIdentifier, CpeParseError>;
}

/// Decides whether an advisory applies to an exact package build on a platform
pub trait ApplicabilityOracle {
    /// Returns true when the advisory is known NOT to apply
    /// (fixed, backported, not affected, ...)
    fn check(
        &self,
        pkg: &PackageIdentifier,
        distro: &PlatformIdentifier,
        advisory_name: &str,
    ) -> bool;
}

/// Builds an oracle over an advisory collection
pub trait OracleFactory: Send + Sync {
    fn build_oracle<'a>(
        &self,
        collection: &'a AdvisoryCollection,
    ) -> Result<Box<dyn ApplicabilityOracle + 'a>>;
}

/// A non-fatal condition hit while building an index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Advisory the entry belongs to
    pub advisory: String,
    /// The package specifier that failed to parse
    pub package_spec: String,
    pub error: PackageParseError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: failed to parse package {:?}: {}",
            self.advisory, self.package_spec, self.error
        )
    }
}

/// Receives diagnostics for skipped entries
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, diagnostic: Diagnostic);
}
