//! fixcheck Ident - Package and platform identifier parsing
//!
//! This crate provides the default parsers plugged into the resolver:
//! - RPM package specifier parsing (`name-[epoch:]version-release[.arch]`)
//! - rpm version comparison (`rpmvercmp`)
//! - CPE 2.2/2.3 parsing and platform matching

pub mod cpe;
pub mod rpm;

pub use cpe::{matches_platform, CpeParser};
pub use rpm::{compare_evr, rpmvercmp, RpmParser};
