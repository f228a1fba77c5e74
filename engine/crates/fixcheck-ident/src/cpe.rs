//! CPE (Common Platform Enumeration) parsing and platform matching
//!
//! Distribution identifiers arrive as CPE 2.2 URIs (`cpe:/o:redhat:enterprise_linux:8`),
//! which is what Red Hat security data uses, or as CPE 2.3 formatted strings.

use fixcheck_core::{Cpe, CpeParseError, CpePart, PlatformIdentifier, PlatformParser};

/// Default platform parser
#[derive(Debug, Clone, Copy, Default)]
pub struct CpeParser;

impl PlatformParser for CpeParser {
    fn parse(&self, spec: &str) -> Result<PlatformIdentifier, CpeParseError> {
        parse(spec)
    }
}

/// Parse a CPE 2.2 or 2.3 formatted string
pub fn parse(cpe_str: &str) -> Result<Cpe, CpeParseError> {
    let normalized = if cpe_str.starts_with("cpe:2.3:") {
        cpe_str.to_string()
    } else if cpe_str.starts_with("cpe:/") {
        convert_22_to_23(cpe_str)?
    } else {
        return Err(CpeParseError::InvalidPrefix);
    };

    let parts = split_components(&normalized);
    if parts.len() < 5 {
        return Err(CpeParseError::TooFewComponents);
    }

    let component = |i: usize| unescape(parts.get(i).copied().unwrap_or("*"));

    Ok(Cpe {
        part: parse_part(parts[2])?,
        vendor: component(3),
        product: component(4),
        version: component(5),
        update: component(6),
        edition: component(7),
        language: component(8),
        sw_edition: component(9),
        target_sw: component(10),
        target_hw: component(11),
        other: component(12),
    })
}

fn parse_part(s: &str) -> Result<CpePart, CpeParseError> {
    match s.to_lowercase().as_str() {
        "a" => Ok(CpePart::Application),
        "o" => Ok(CpePart::OperatingSystem),
        "h" => Ok(CpePart::Hardware),
        "*" | "" => Ok(CpePart::Any),
        _ => Err(CpeParseError::InvalidPart(s.to_string())),
    }
}

fn convert_22_to_23(cpe_22: &str) -> Result<String, CpeParseError> {
    let without_prefix = cpe_22
        .strip_prefix("cpe:/")
        .ok_or(CpeParseError::InvalidPrefix)?;
    let parts = split_components(without_prefix);
    // part, vendor and product are required
    if parts.len() < 3 {
        return Err(CpeParseError::TooFewComponents);
    }

    let mut result = String::from("cpe:2.3");
    for part in &parts {
        result.push(':');
        // 2.2 leaves trailing or skipped components empty
        if part.is_empty() {
            result.push('*');
        } else {
            result.push_str(part);
        }
    }

    // part plus the ten named components
    for _ in parts.len()..11 {
        result.push_str(":*");
    }

    Ok(result)
}

/// Split on `:` separators, leaving `\:` escapes inside their component
fn split_components(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ':' => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);

    parts
}

fn unescape(s: &str) -> String {
    s.replace("\\:", ":")
        .replace("\\*", "*")
        .replace("\\?", "?")
        .replace("%21", "!")
        .replace("%22", "\"")
        .replace("%23", "#")
        .replace("%24", "$")
        .replace("%25", "%")
        .replace("%26", "&")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2a", "*")
        .replace("%2b", "+")
        .replace("%2c", ",")
        .replace("%2f", "/")
}

/// Check whether `pattern` (the platform an advisory entry was published for)
/// covers `target` (the platform being scanned).
///
/// The part is ignored: Red Hat publishes fixes for layered products under
/// `cpe:/a:` while hosts identify as `cpe:/o:`.
pub fn matches_platform(pattern: &Cpe, target: &Cpe) -> bool {
    component_matches(&pattern.vendor, &target.vendor)
        && component_matches(&pattern.product, &target.product)
        && component_matches(&pattern.version, &target.version)
}

fn component_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" || value == "*" {
        return true;
    }
    if pattern == "-" || value == "-" {
        return pattern == value;
    }

    let pattern_lower = pattern.to_lowercase();
    let value_lower = value.to_lowercase();

    if pattern_lower.contains('*') {
        let parts: Vec<&str> = pattern_lower.split('*').collect();
        if parts.len() == 2 {
            // prefix and suffix must not overlap
            return value_lower.len() >= parts[0].len() + parts[1].len()
                && value_lower.starts_with(parts[0])
                && value_lower.ends_with(parts[1]);
        }
    }

    pattern_lower == value_lower
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpe_22() {
        let cpe = parse("cpe:/o:redhat:enterprise_linux:8").unwrap();
        assert_eq!(cpe.part, CpePart::OperatingSystem);
        assert_eq!(cpe.vendor, "redhat");
        assert_eq!(cpe.product, "enterprise_linux");
        assert_eq!(cpe.version, "8");
        assert_eq!(cpe.update, "*");
    }

    #[test]
    fn test_parse_cpe_22_skipped_component() {
        let cpe = parse("cpe:/a:redhat:enterprise_linux:8::appstream").unwrap();
        assert_eq!(cpe.part, CpePart::Application);
        assert_eq!(cpe.update, "*");
        assert_eq!(cpe.edition, "appstream");
    }

    #[test]
    fn test_parse_cpe_23() {
        let cpe = parse("cpe:2.3:o:redhat:enterprise_linux:7:*:*:*:*:*:*:*").unwrap();
        assert_eq!(cpe.part, CpePart::OperatingSystem);
        assert_eq!(cpe.version, "7");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("redhat:8"), Err(CpeParseError::InvalidPrefix));
        assert_eq!(parse("cpe:/o:redhat"), Err(CpeParseError::TooFewComponents));
        assert_eq!(
            parse("cpe:/x:redhat:enterprise_linux:8"),
            Err(CpeParseError::InvalidPart("x".into()))
        );
    }

    #[test]
    fn test_parser_trait() {
        let parser = CpeParser;
        assert!(parser.parse("cpe:/o:redhat:enterprise_linux:8").is_ok());
        assert!(parser.parse("not a cpe").is_err());
    }

    #[test]
    fn test_matches_platform() {
        let host = parse("cpe:/o:redhat:enterprise_linux:8").unwrap();

        let same = parse("cpe:/o:redhat:enterprise_linux:8").unwrap();
        let appstream = parse("cpe:/a:redhat:enterprise_linux:8::appstream").unwrap();
        let any_version = parse("cpe:/o:redhat:enterprise_linux").unwrap();
        let rhel7 = parse("cpe:/o:redhat:enterprise_linux:7").unwrap();
        let other = parse("cpe:/o:centos:centos:8").unwrap();

        assert!(matches_platform(&same, &host));
        assert!(matches_platform(&appstream, &host));
        assert!(matches_platform(&any_version, &host));
        assert!(!matches_platform(&rhel7, &host));
        assert!(!matches_platform(&other, &host));
    }

    #[test]
    fn test_wildcard_component() {
        assert!(component_matches("8*", "8.2"));
        assert!(component_matches("*", "8"));
        assert!(!component_matches("7*", "8.2"));
        assert!(component_matches("RedHat", "redhat"));
    }

    #[test]
    fn test_wildcard_prefix_suffix_overlap() {
        assert!(!component_matches("8*8", "8"));
        assert!(component_matches("8*8", "88"));
        assert!(component_matches("8*8", "8.8"));
    }

    #[test]
    fn test_parse_escaped_colon() {
        let cpe = parse("cpe:2.3:a:vendor:pro\\:duct:1.0:*:*:*:*:*:*:*").unwrap();
        assert_eq!(cpe.vendor, "vendor");
        assert_eq!(cpe.product, "pro:duct");
        assert_eq!(cpe.version, "1.0");
        assert_eq!(cpe.update, "*");

        let cpe = parse("cpe:/a:vendor:pro\\:duct:2.0").unwrap();
        assert_eq!(cpe.product, "pro:duct");
        assert_eq!(cpe.version, "2.0");
    }
}
