//! Advisory records - the security data the package index is built from
//!
//! Field names follow the Red Hat security data API so that CVE documents
//! can be deserialized as-is.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::ops::Deref;

/// A single security advisory (usually a CVE entry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// Unique advisory name, e.g. "CVE-2020-0001"
    pub name: String,

    /// Fixes shipped for a full package specifier
    #[serde(default, rename = "affected_release")]
    pub release_fixes: Vec<ReleaseFix>,

    /// Per-package status (not affected, will not fix, ...)
    #[serde(default, rename = "package_state")]
    pub package_states: Vec<PackageState>,
}

/// A fix released for a specific package build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFix {
    /// Full package specifier (name-version-release), may be absent
    #[serde(default, rename = "package")]
    pub package_spec: Option<String>,

    /// Product the fix was released for
    #[serde(default)]
    pub product_name: Option<String>,

    /// Erratum that shipped the fix (e.g. RHSA-2020:1234)
    #[serde(default)]
    pub advisory: Option<String>,

    /// Platform CPE of the product
    #[serde(default)]
    pub cpe: Option<String>,
}

/// Advisory status for a bare package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageState {
    /// Base package name, may be absent
    #[serde(default, rename = "package_name")]
    pub base_name: Option<String>,

    #[serde(default)]
    pub product_name: Option<String>,

    /// e.g. "Not affected", "Will not fix", "Affected"
    #[serde(default)]
    pub fix_state: Option<String>,

    #[serde(default)]
    pub cpe: Option<String>,
}

impl AdvisoryRecord {
    /// Create an advisory with no package associations
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            release_fixes: Vec::new(),
            package_states: Vec::new(),
        }
    }

    /// Add a release fix for a full package specifier
    pub fn with_release_fix(mut self, package_spec: impl Into<String>) -> Self {
        self.release_fixes.push(ReleaseFix {
            package_spec: Some(package_spec.into()),
            ..Default::default()
        });
        self
    }

    pub fn with_fix(mut self, fix: ReleaseFix) -> Self {
        self.release_fixes.push(fix);
        self
    }

    /// Add a package state for a base package name
    pub fn with_package_state(mut self, base_name: impl Into<String>) -> Self {
        self.package_states.push(PackageState {
            base_name: Some(base_name.into()),
            ..Default::default()
        });
        self
    }

    pub fn with_state(mut self, state: PackageState) -> Self {
        self.package_states.push(state);
        self
    }
}

impl ReleaseFix {
    /// The package specifier, if present and non-empty
    pub fn package(&self) -> Option<&str> {
        self.package_spec.as_deref().filter(|s| !s.is_empty())
    }
}

impl PackageState {
    /// The base package name, if present and non-empty
    pub fn package(&self) -> Option<&str> {
        self.base_name.as_deref().filter(|s| !s.is_empty())
    }
}

/// Ordered collection of advisories. Order is preserved in index buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisoryCollection {
    records: Vec<AdvisoryRecord>,
}

impl AdvisoryCollection {
    pub fn new(records: Vec<AdvisoryRecord>) -> Self {
        Self { records }
    }

    /// Parse a JSON array of advisory records
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read a JSON array of advisory records
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Find an advisory by name
    pub fn get(&self, name: &str) -> Option<&AdvisoryRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

impl Deref for AdvisoryCollection {
    type Target = [AdvisoryRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl From<Vec<AdvisoryRecord>> for AdvisoryCollection {
    fn from(records: Vec<AdvisoryRecord>) -> Self {
        Self::new(records)
    }
}

impl FromIterator<AdvisoryRecord> for AdvisoryCollection {
    fn from_iter<I: IntoIterator<Item = AdvisoryRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_from_json() {
        let json = r#"[
            {
                "name": "CVE-2020-0001",
                "affected_release": [
                    {
                        "product_name": "Red Hat Enterprise Linux 8",
                        "advisory": "RHSA-2020:1234",
                        "package": "bash-0:4.4.19-12.el8",
                        "cpe": "cpe:/o:redhat:enterprise_linux:8"
                    },
                    {"product_name": "Red Hat Enterprise Linux 7"}
                ],
                "package_state": [
                    {"package_name": "zsh", "fix_state": "Not affected"}
                ]
            },
            {"name": "CVE-2020-0002"}
        ]"#;

        let feed = AdvisoryCollection::from_json(json).unwrap();
        assert_eq!(feed.len(), 2);

        let first = &feed[0];
        assert_eq!(first.release_fixes.len(), 2);
        assert_eq!(first.release_fixes[0].package(), Some("bash-0:4.4.19-12.el8"));
        assert_eq!(first.release_fixes[1].package(), None);
        assert_eq!(first.package_states[0].package(), Some("zsh"));
        assert_eq!(
            first.package_states[0].fix_state.as_deref(),
            Some("Not affected")
        );

        assert!(feed[1].release_fixes.is_empty());
        assert!(feed.get("CVE-2020-0002").is_some());
        assert!(feed.get("CVE-1999-0000").is_none());
    }

    #[test]
    fn test_empty_strings_are_not_packages() {
        let fix = ReleaseFix {
            package_spec: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(fix.package(), None);

        let state = PackageState {
            base_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(state.package(), None);
    }

    #[test]
    fn test_malformed_json() {
        assert!(AdvisoryCollection::from_json("{\"name\": 1}").is_err());
    }
}
