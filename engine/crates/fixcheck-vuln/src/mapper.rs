//! Package mapper - indexes advisories by base package name
//!
//! Packages are identified by their base names, without epoch, version or
//! release. An advisory is filed under every package it mentions, either
//! through a released fix or through a package state entry.

use fixcheck_core::{AdvisoryCollection, AdvisoryRecord, Diagnostic, DiagnosticSink, PackageParser};
use fixcheck_ident::RpmParser;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Association between base package names and the advisories, fixed or not,
/// recorded against them. Buckets keep collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex<'a> {
    buckets: HashMap<String, Vec<&'a AdvisoryRecord>>,
}

impl<'a> PackageIndex<'a> {
    /// Advisories recorded against a base package name
    pub fn get(&self, package: &str) -> Option<&[&'a AdvisoryRecord]> {
        self.buckets.get(package).map(Vec::as_slice)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.buckets.contains_key(package)
    }

    /// Indexed base package names, in no particular order
    pub fn packages(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[&'a AdvisoryRecord])> + '_ {
        self.buckets
            .iter()
            .map(|(name, advisories)| (name.as_str(), advisories.as_slice()))
    }

    /// Number of distinct packages
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Builds a [`PackageIndex`] from an advisory collection
#[derive(Clone)]
pub struct PackageMapper {
    parser: Arc<dyn PackageParser>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Default for PackageMapper {
    fn default() -> Self {
        Self::new(Arc::new(RpmParser))
    }
}

impl PackageMapper {
    /// Create a mapper reporting diagnostics through `tracing`
    pub fn new(parser: Arc<dyn PackageParser>) -> Self {
        Self {
            parser,
            sink: Arc::new(TracingSink),
        }
    }

    /// Report diagnostics to a different sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Index every advisory of the collection under the packages it mentions.
    ///
    /// Release fixes whose package specifier can't be parsed are reported to
    /// the diagnostic sink and skipped; the build itself never fails.
    pub fn build_index<'a>(&self, collection: &'a AdvisoryCollection) -> PackageIndex<'a> {
        let mut buckets: HashMap<String, Vec<&'a AdvisoryRecord>> = HashMap::new();

        for advisory in collection.iter() {
            for package in self.candidate_packages(advisory) {
                buckets.entry(package).or_default().push(advisory);
            }
        }

        debug!(
            "Indexed {} advisories under {} packages",
            collection.len(),
            buckets.len()
        );

        PackageIndex { buckets }
    }

    /// Base package names mentioned by an advisory: release fixes first,
    /// then package states, first occurrence wins.
    fn candidate_packages(&self, advisory: &AdvisoryRecord) -> Vec<String> {
        let mut packages = Vec::new();

        for spec in advisory.release_fixes.iter().filter_map(|fix| fix.package()) {
            match self.parser.parse(spec) {
                Ok(pkg) => add_package(&mut packages, pkg.name),
                Err(error) => self.sink.record(Diagnostic {
                    advisory: advisory.name.clone(),
                    package_spec: spec.to_string(),
                    error,
                }),
            }
        }

        for name in advisory.package_states.iter().filter_map(|state| state.package()) {
            add_package(&mut packages, name.to_string());
        }

        packages
    }
}

/// Adds `pkg` only if not already there. Candidate lists are tiny, a set
/// would be overkill.
fn add_package(packages: &mut Vec<String>, pkg: String) {
    if !packages.contains(&pkg) {
        packages.push(pkg);
    }
}

/// Emits diagnostics as `tracing` warnings
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        warn!(
            advisory = %diagnostic.advisory,
            package = %diagnostic.package_spec,
            "feed: failed to parse package: {}",
            diagnostic.error
        );
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, diagnostic: Diagnostic) {
        if let Ok(mut diagnostics) = self.diagnostics.lock() {
            diagnostics.push(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixcheck_core::{PackageParseError, PackageState, ReleaseFix};

    fn names(advisories: &[&AdvisoryRecord]) -> Vec<String> {
        advisories.iter().map(|a| a.name.clone()).collect()
    }

    #[test]
    fn test_index_release_fix() {
        let feed = AdvisoryCollection::new(vec![
            AdvisoryRecord::new("CVE-2020-0001").with_release_fix("bash-4.4-20.el8")
        ]);

        let index = PackageMapper::default().build_index(&feed);
        assert_eq!(index.len(), 1);
        assert_eq!(names(index.get("bash").unwrap()), vec!["CVE-2020-0001"]);
    }

    #[test]
    fn test_empty_specifier_contributes_nothing() {
        let feed = AdvisoryCollection::new(vec![AdvisoryRecord::new("CVE-2020-0002")
            .with_release_fix("")
            .with_package_state("bash")]);

        let index = PackageMapper::default().build_index(&feed);
        assert_eq!(index.packages().collect::<Vec<_>>(), vec!["bash"]);
    }

    #[test]
    fn test_no_candidates() {
        let feed = AdvisoryCollection::new(vec![AdvisoryRecord::new("CVE-2020-0003")
            .with_fix(ReleaseFix::default())
            .with_state(PackageState::default())]);

        let index = PackageMapper::default().build_index(&feed);
        assert!(index.is_empty());
    }

    #[test]
    fn test_same_package_from_both_sources() {
        let feed = AdvisoryCollection::new(vec![AdvisoryRecord::new("CVE-2020-0004")
            .with_release_fix("bash-4.4-20.el8")
            .with_release_fix("bash-4.2.46-34.el7")
            .with_package_state("bash")
            .with_package_state("zsh")]);

        let index = PackageMapper::default().build_index(&feed);
        assert_eq!(names(index.get("bash").unwrap()), vec!["CVE-2020-0004"]);
        assert_eq!(names(index.get("zsh").unwrap()), vec!["CVE-2020-0004"]);
    }

    #[test]
    fn test_bucket_keeps_collection_order() {
        let feed = AdvisoryCollection::new(vec![
            AdvisoryRecord::new("CVE-2021-0002").with_package_state("openssl"),
            AdvisoryRecord::new("CVE-2021-0001").with_release_fix("openssl-1.1.1g-15.el8_3"),
            AdvisoryRecord::new("CVE-2021-0003").with_package_state("openssl"),
        ]);

        let index = PackageMapper::default().build_index(&feed);
        assert_eq!(
            names(index.get("openssl").unwrap()),
            vec!["CVE-2021-0002", "CVE-2021-0001", "CVE-2021-0003"]
        );
    }

    #[test]
    fn test_unparsable_specifier_is_reported() {
        let feed = AdvisoryCollection::new(vec![AdvisoryRecord::new("CVE-2020-0005")
            .with_release_fix("garbage")
            .with_release_fix("kernel-4.18.0-240.el8")]);

        let sink = Arc::new(CollectingSink::new());
        let index = PackageMapper::default()
            .with_sink(sink.clone())
            .build_index(&feed);

        assert_eq!(index.packages().collect::<Vec<_>>(), vec!["kernel"]);
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic {
                advisory: "CVE-2020-0005".into(),
                package_spec: "garbage".into(),
                error: PackageParseError::MissingComponent("release"),
            }]
        );
    }

    #[test]
    fn test_add_package_dedup() {
        let mut pkgs = Vec::new();
        add_package(&mut pkgs, "bash".into());
        add_package(&mut pkgs, "zsh".into());
        add_package(&mut pkgs, "bash".into());
        assert_eq!(pkgs, vec!["bash", "zsh"]);
    }
}
