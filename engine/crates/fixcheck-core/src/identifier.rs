//! Parsed package and platform identifiers
//!
//! Parsing lives in `fixcheck-ident`; these are the shapes the resolver and
//! oracles exchange.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// An installed or fixed package build (rpm NEVRA)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentifier {
    /// Base package name, without epoch, version or release
    pub name: String,
    pub epoch: Option<u32>,
    pub version: String,
    pub release: String,
    pub arch: Option<String>,
}

impl PackageIdentifier {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            epoch: None,
            version: version.into(),
            release: release.into(),
            arch: None,
        }
    }

    pub fn with_epoch(mut self, epoch: u32) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    /// Epoch, treating a missing one as 0
    pub fn epoch_or_zero(&self) -> u32 {
        self.epoch.unwrap_or(0)
    }
}

impl fmt::Display for PackageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.name)?;
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }
        write!(f, "{}-{}", self.version, self.release)?;
        if let Some(ref arch) = self.arch {
            write!(f, ".{}", arch)?;
        }
        Ok(())
    }
}

/// Package specifier parsing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackageParseError {
    #[error("empty package specifier")]
    Empty,

    #[error("missing {0} component")]
    MissingComponent(&'static str),

    #[error("empty package name")]
    EmptyName,

    #[error("invalid epoch: {0}")]
    InvalidEpoch(String),
}

/// CPE platform identifier
/// Format: cpe:2.3:part:vendor:product:version:update:edition:language:sw_edition:target_sw:target_hw:other
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cpe {
    /// Part: 'a' (application), 'o' (OS), 'h' (hardware)
    pub part: CpePart,
    pub vendor: String,
    pub product: String,
    pub version: String,
    pub update: String,
    pub edition: String,
    pub language: String,
    pub sw_edition: String,
    pub target_sw: String,
    pub target_hw: String,
    pub other: String,
}

/// Distribution identifiers are CPEs
pub type PlatformIdentifier = Cpe;

/// CPE part type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CpePart {
    Application,
    OperatingSystem,
    Hardware,
    #[default]
    Any,
}

impl fmt::Display for CpePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpePart::Application => write!(f, "a"),
            CpePart::OperatingSystem => write!(f, "o"),
            CpePart::Hardware => write!(f, "h"),
            CpePart::Any => write!(f, "*"),
        }
    }
}

impl Default for Cpe {
    fn default() -> Self {
        Self {
            part: CpePart::Any,
            vendor: "*".to_string(),
            product: "*".to_string(),
            version: "*".to_string(),
            update: "*".to_string(),
            edition: "*".to_string(),
            language: "*".to_string(),
            sw_edition: "*".to_string(),
            target_sw: "*".to_string(),
            target_hw: "*".to_string(),
            other: "*".to_string(),
        }
    }
}

impl Cpe {
    /// Format as CPE 2.3 string
    pub fn to_cpe_string(&self) -> String {
        format!(
            "cpe:2.3:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.part,
            self.vendor,
            self.product,
            self.version,
            self.update,
            self.edition,
            self.language,
            self.sw_edition,
            self.target_sw,
            self.target_hw,
            self.other
        )
    }
}

impl fmt::Display for Cpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cpe_string())
    }
}

/// CPE parsing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CpeParseError {
    #[error("CPE must start with 'cpe:2.3:' or 'cpe:/'")]
    InvalidPrefix,

    #[error("CPE has too few components")]
    TooFewComponents,

    #[error("Invalid CPE part: {0}")]
    InvalidPart(String),
}
