//! fixcheck Vuln - Package index and fixed advisory resolution
//!
//! This crate provides the resolution engine that:
//! - Indexes advisories by the base package names they mention
//! - Lists, for an installed package on a distribution, the advisories
//!   known not to apply
//! - Ships a release-fix checker as the default applicability oracle

pub mod checker;
pub mod mapper;
pub mod resolver;

pub use checker::{ReleaseFixChecker, ReleaseFixOracleFactory};
pub use mapper::{CollectingSink, PackageIndex, PackageMapper, TracingSink};
pub use resolver::FixedAdvisoryResolver;
