//! RPM package specifier parsing and version comparison
//!
//! Accepts the forms reported by `rpm -qa` and used in Red Hat security data:
//! `name-version-release`, `name-epoch:version-release`, `epoch:name-version-release`,
//! each optionally followed by `.arch`.

use fixcheck_core::{PackageIdentifier, PackageParseError, PackageParser};
use std::cmp::Ordering;

/// Architectures recognised as a trailing `.arch` suffix
const KNOWN_ARCHES: &[&str] = &[
    "x86_64", "i386", "i486", "i586", "i686", "noarch", "aarch64", "ppc", "ppc64", "ppc64le",
    "ppc64p7", "s390", "s390x", "armv7hl", "src", "nosrc",
];

/// Default package parser
#[derive(Debug, Clone, Copy, Default)]
pub struct RpmParser;

impl PackageParser for RpmParser {
    fn parse(&self, spec: &str) -> Result<PackageIdentifier, PackageParseError> {
        parse(spec)
    }
}

/// Parse an rpm package specifier
pub fn parse(spec: &str) -> Result<PackageIdentifier, PackageParseError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(PackageParseError::Empty);
    }

    let (rest, arch) = match spec.rsplit_once('.') {
        Some((rest, arch)) if KNOWN_ARCHES.contains(&arch) => (rest, Some(arch)),
        _ => (spec, None),
    };

    let (rest, release) = rest
        .rsplit_once('-')
        .filter(|(_, release)| !release.is_empty())
        .ok_or(PackageParseError::MissingComponent("release"))?;

    let (name, version) = rest
        .rsplit_once('-')
        .ok_or(PackageParseError::MissingComponent("version"))?;

    let (mut epoch, version) = match version.split_once(':') {
        Some((e, v)) => (Some(parse_epoch(e)?), v),
        None => (None, version),
    };
    if version.is_empty() {
        return Err(PackageParseError::MissingComponent("version"));
    }

    // yum style: epoch before the name
    let name = match name.split_once(':') {
        Some((e, n)) if epoch.is_none() => {
            epoch = Some(parse_epoch(e)?);
            n
        }
        Some((e, _)) => return Err(PackageParseError::InvalidEpoch(e.to_string())),
        None => name,
    };
    if name.is_empty() {
        return Err(PackageParseError::EmptyName);
    }

    Ok(PackageIdentifier {
        name: name.to_string(),
        epoch,
        version: version.to_string(),
        release: release.to_string(),
        arch: arch.map(String::from),
    })
}

fn parse_epoch(s: &str) -> Result<u32, PackageParseError> {
    s.parse()
        .map_err(|_| PackageParseError::InvalidEpoch(s.to_string()))
}

/// Compare two packages by epoch, version, then release. Names are not compared.
pub fn compare_evr(a: &PackageIdentifier, b: &PackageIdentifier) -> Ordering {
    a.epoch_or_zero()
        .cmp(&b.epoch_or_zero())
        .then_with(|| rpmvercmp(&a.version, &b.version))
        .then_with(|| rpmvercmp(&a.release, &b.release))
}

/// Compare two version or release strings the way rpm does.
///
/// Strings are split into alphabetic and numeric segments; separators only
/// delimit. Numeric segments are newer than alphabetic ones, `~` sorts before
/// anything (pre-releases) and `^` sorts after the base version but before
/// any further segment.
pub fn rpmvercmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0, 0);

    while i < a.len() || j < b.len() {
        i = skip_separators(a, i);
        j = skip_separators(b, j);

        let a_tilde = a.get(i) == Some(&b'~');
        let b_tilde = b.get(j) == Some(&b'~');
        if a_tilde || b_tilde {
            if !a_tilde {
                return Ordering::Greater;
            }
            if !b_tilde {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        let a_caret = a.get(i) == Some(&b'^');
        let b_caret = b.get(j) == Some(&b'^');
        if a_caret || b_caret {
            if i >= a.len() {
                return Ordering::Less;
            }
            if j >= b.len() {
                return Ordering::Greater;
            }
            if !a_caret {
                return Ordering::Greater;
            }
            if !b_caret {
                return Ordering::Less;
            }
            i += 1;
            j += 1;
            continue;
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        let numeric = a[i].is_ascii_digit();
        let a_end = segment_end(a, i, numeric);
        let b_end = segment_end(b, j, numeric);

        // segments of different type
        if b_end == j {
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let ord = if numeric {
            compare_numeric(&a[i..a_end], &b[j..b_end])
        } else {
            a[i..a_end].cmp(&b[j..b_end])
        };
        if ord != Ordering::Equal {
            return ord;
        }

        i = a_end;
        j = b_end;
    }

    match (i >= a.len(), j >= b.len()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        _ => Ordering::Greater,
    }
}

fn skip_separators(s: &[u8], mut pos: usize) -> usize {
    while pos < s.len() && !s[pos].is_ascii_alphanumeric() && s[pos] != b'~' && s[pos] != b'^' {
        pos += 1;
    }
    pos
}

fn segment_end(s: &[u8], pos: usize, numeric: bool) -> usize {
    let in_segment = |c: &u8| {
        if numeric {
            c.is_ascii_digit()
        } else {
            c.is_ascii_alphabetic()
        }
    };
    s[pos..]
        .iter()
        .position(|c| !in_segment(c))
        .map_or(s.len(), |n| pos + n)
}

fn compare_numeric(a: &[u8], b: &[u8]) -> Ordering {
    let a = trim_leading_zeros(a);
    let b = trim_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}
