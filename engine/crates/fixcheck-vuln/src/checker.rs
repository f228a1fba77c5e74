//! Release-fix checker - the default applicability oracle
//!
//! An advisory is known not to apply to an installed package when either:
//! - the vendor states the package is not affected on that platform, or
//! - a fix was released for that platform at or below the installed version.

use fixcheck_common::CheckerConfig;
use fixcheck_core::{
    AdvisoryCollection, ApplicabilityOracle, Cpe, Error, OracleFactory, PackageIdentifier,
    PlatformIdentifier, Result,
};
use fixcheck_ident::{compare_evr, cpe, matches_platform, rpm};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, trace};

/// Builds [`ReleaseFixChecker`]s
#[derive(Debug, Clone, Default)]
pub struct ReleaseFixOracleFactory {
    config: CheckerConfig,
}

impl ReleaseFixOracleFactory {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }
}

impl OracleFactory for ReleaseFixOracleFactory {
    fn build_oracle<'a>(
        &self,
        collection: &'a AdvisoryCollection,
    ) -> Result<Box<dyn ApplicabilityOracle + 'a>> {
        Ok(Box::new(ReleaseFixChecker::new(collection, &self.config)?))
    }
}

/// A fixed build shipped for a platform
#[derive(Debug)]
struct FixedRelease {
    package: PackageIdentifier,
    platform: Option<Cpe>,
}

/// A "not affected"-like state for a package on a platform
#[derive(Debug)]
struct InapplicableState<'a> {
    package: &'a str,
    platform: Option<Cpe>,
}

#[derive(Debug, Default)]
struct AdvisoryRules<'a> {
    fixes: Vec<FixedRelease>,
    states: Vec<InapplicableState<'a>>,
}

/// Checks advisories against the fixes and package states they record
#[derive(Debug)]
pub struct ReleaseFixChecker<'a> {
    advisories: HashMap<&'a str, AdvisoryRules<'a>>,
}

impl<'a> ReleaseFixChecker<'a> {
    /// Precompute the rules of every advisory. Fails on a malformed platform CPE.
    pub fn new(collection: &'a AdvisoryCollection, config: &CheckerConfig) -> Result<Self> {
        let mut advisories: HashMap<&'a str, AdvisoryRules<'a>> = HashMap::new();

        for advisory in collection.iter() {
            let rules = advisories.entry(advisory.name.as_str()).or_default();

            for fix in &advisory.release_fixes {
                let platform = parse_platform(&advisory.name, fix.cpe.as_deref())?;
                let Some(spec) = fix.package() else {
                    continue;
                };
                // already reported while indexing
                let Ok(package) = rpm::parse(spec) else {
                    trace!("{}: ignoring unparsable fix {:?}", advisory.name, spec);
                    continue;
                };
                rules.fixes.push(FixedRelease { package, platform });
            }

            for state in &advisory.package_states {
                let platform = parse_platform(&advisory.name, state.cpe.as_deref())?;
                let inapplicable = state
                    .fix_state
                    .as_deref()
                    .is_some_and(|s| config.is_inapplicable_state(s));
                if let (Some(package), true) = (state.package(), inapplicable) {
                    rules.states.push(InapplicableState { package, platform });
                }
            }
        }

        debug!("Built release-fix checker over {} advisories", advisories.len());

        Ok(Self { advisories })
    }
}

impl ApplicabilityOracle for ReleaseFixChecker<'_> {
    fn check(
        &self,
        pkg: &PackageIdentifier,
        distro: &PlatformIdentifier,
        advisory_name: &str,
    ) -> bool {
        let Some(rules) = self.advisories.get(advisory_name) else {
            return false;
        };

        let not_affected = rules
            .states
            .iter()
            .any(|s| s.package == pkg.name && covers(s.platform.as_ref(), distro));

        not_affected
            || rules.fixes.iter().any(|fix| {
                fix.package.name == pkg.name
                    && arch_compatible(&fix.package, pkg)
                    && covers(fix.platform.as_ref(), distro)
                    && compare_evr(pkg, &fix.package) != Ordering::Less
            })
    }
}

fn parse_platform(advisory: &str, cpe_str: Option<&str>) -> Result<Option<Cpe>> {
    match cpe_str.filter(|s| !s.is_empty()) {
        Some(s) => cpe::parse(s).map(Some).map_err(|e| {
            Error::Construction(format!("{}: invalid platform cpe {:?}: {}", advisory, s, e))
        }),
        None => Ok(None),
    }
}

/// Entries without a platform apply everywhere
fn covers(platform: Option<&Cpe>, distro: &PlatformIdentifier) -> bool {
    platform.map_or(true, |p| matches_platform(p, distro))
}

fn arch_compatible(fixed: &PackageIdentifier, installed: &PackageIdentifier) -> bool {
    match (fixed.arch.as_deref(), installed.arch.as_deref()) {
        (Some(a), Some(b)) => {
            a == b || matches!(a, "noarch" | "src" | "nosrc") || b == "noarch"
        }
        _ => true,
    }
}
