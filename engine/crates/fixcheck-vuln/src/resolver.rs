//! Fixed advisory resolver - lists advisories that don't apply to an installed package
//!
//! Those advisories could be inapplicable for various reasons, for instance
//! the packaged version isn't vulnerable or a fix has been backported.

use crate::checker::ReleaseFixOracleFactory;
use crate::mapper::{PackageMapper, TracingSink};
use fixcheck_common::Config;
use fixcheck_core::{
    AdvisoryCollection, DiagnosticSink, Error, OracleFactory, PackageParser, PlatformParser,
    Result,
};
use fixcheck_ident::{CpeParser, RpmParser};
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Resolves inapplicable advisories for (distribution, package) pairs
pub struct FixedAdvisoryResolver {
    collection: AdvisoryCollection,
    platform_parser: Arc<dyn PlatformParser>,
    package_parser: Arc<dyn PackageParser>,
    oracle_factory: Arc<dyn OracleFactory>,
    sink: Arc<dyn DiagnosticSink>,
}

impl FixedAdvisoryResolver {
    /// Create a resolver using CPE distro identifiers, rpm package names and
    /// the release-fix checker
    pub fn new(collection: AdvisoryCollection) -> Self {
        Self {
            collection,
            platform_parser: Arc::new(CpeParser),
            package_parser: Arc::new(RpmParser),
            oracle_factory: Arc::new(ReleaseFixOracleFactory::default()),
            sink: Arc::new(TracingSink),
        }
    }

    /// Create a resolver whose checker follows the `[checker]` configuration
    pub fn from_config(collection: AdvisoryCollection, config: &Config) -> Self {
        Self::new(collection).with_oracle_factory(Arc::new(ReleaseFixOracleFactory::new(
            config.checker.clone(),
        )))
    }

    pub fn with_platform_parser(mut self, parser: Arc<dyn PlatformParser>) -> Self {
        self.platform_parser = parser;
        self
    }

    pub fn with_package_parser(mut self, parser: Arc<dyn PackageParser>) -> Self {
        self.package_parser = parser;
        self
    }

    pub fn with_oracle_factory(mut self, factory: Arc<dyn OracleFactory>) -> Self {
        self.oracle_factory = factory;
        self
    }

    /// Where index build diagnostics go (default: tracing warnings)
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn collection(&self) -> &AdvisoryCollection {
        &self.collection
    }

    /// The mapper used to index the collection
    pub fn mapper(&self) -> PackageMapper {
        PackageMapper::new(self.package_parser.clone()).with_sink(self.sink.clone())
    }

    /// List the advisories that aren't applicable for the given (distro, package).
    ///
    /// `distro` identifies the distribution (a CPE such as
    /// `cpe:/o:redhat:enterprise_linux:8`), `pkg` is the full package name as
    /// reported by `rpm -qa`. A package with no recorded advisories yields an
    /// empty list.
    pub fn list_inapplicable(&self, distro: &str, pkg: &str) -> Result<Vec<String>> {
        let _span = debug_span!("list_inapplicable", distro, pkg).entered();

        let platform = self
            .platform_parser
            .parse(distro)
            .map_err(|e| Error::distro(distro, e))?;
        let package = self
            .package_parser
            .parse(pkg)
            .map_err(|e| Error::package(pkg, e))?;

        let index = self.mapper().build_index(&self.collection);
        let oracle = self
            .oracle_factory
            .build_oracle(&self.collection)
            .map_err(|e| match e {
                Error::Construction(_) => e,
                other => Error::Construction(other.to_string()),
            })?;

        let Some(advisories) = index.get(&package.name) else {
            debug!("No advisories recorded for package {}", package.name);
            return Ok(Vec::new());
        };

        let inapplicable: Vec<String> = advisories
            .iter()
            .filter(|advisory| oracle.check(&package, &platform, &advisory.name))
            .map(|advisory| advisory.name.clone())
            .collect();

        debug!(
            "{} of {} advisories don't apply to {} on {}",
            inapplicable.len(),
            advisories.len(),
            package,
            distro
        );

        Ok(inapplicable)
    }
}
