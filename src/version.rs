//! Acceptance gate for GEFF schema version strings.
//!
//! The accepted form is `major.minor`, optionally followed by a patch
//! number, a development identifier, and any number of `+`/`-` separated
//! build-metadata sections (e.g. `0.2.2.dev20+g611e7a2.d20250719`).
//! Codecs branch on the major.minor pair only; patch and build metadata
//! never influence layout decisions.

use crate::error::{GeffError, Result};

/// Schema revisions this library reads and writes.
pub const SUPPORTED_VERSIONS: &[(u32, u32)] = &[(0, 2), (0, 3), (0, 4)];

/// Version written when the caller does not specify one.
pub const DEFAULT_VERSION: &str = "0.3.0";

/// Returns the major.minor pair of a well-formed version string, or
/// `MalformedVersion` when the string does not parse. A well-formed but
/// unsupported version (e.g. `1.0`) still parses.
pub fn major_minor(version: &str) -> Result<(u32, u32)> {
    parse(version)
}

/// Whether `version` parses and its major.minor is in the supported set.
pub fn is_supported(version: &str) -> bool {
    matches!(major_minor(version), Ok(pair) if SUPPORTED_VERSIONS.contains(&pair))
}

/// Like [`is_supported`], but distinguishes the two rejection reasons.
pub fn check_supported(version: &str) -> Result<(u32, u32)> {
    let pair = major_minor(version)?;
    if SUPPORTED_VERSIONS.contains(&pair) {
        Ok(pair)
    } else {
        Err(GeffError::UnsupportedVersion(version.to_string()))
    }
}

fn parse(version: &str) -> Result<(u32, u32)> {
    let malformed = || GeffError::MalformedVersion(version.to_string());

    // Build metadata starts at the first '+' or '-'; everything before it is
    // the dotted core.
    let (core, build) = match version.find(['+', '-']) {
        Some(at) => (&version[..at], Some(&version[at..])),
        None => (version, None),
    };

    if let Some(build) = build {
        for section in build.split(['+', '-']).skip(1) {
            if !is_build_section(section) {
                return Err(malformed());
            }
        }
    }

    let segments: Vec<&str> = core.split('.').collect();
    if segments.len() < 2 || segments.len() > 4 {
        return Err(malformed());
    }

    let major: u32 = parse_digits(segments[0]).ok_or_else(malformed)?;
    let minor: u32 = parse_digits(segments[1]).ok_or_else(malformed)?;

    // Third segment is a patch number or a development identifier; a fourth
    // segment is only allowed as an identifier following a patch.
    if let Some(third) = segments.get(2) {
        let is_patch = parse_digits(third).is_some();
        if !is_patch && !is_identifier(third) {
            return Err(malformed());
        }
        if let Some(fourth) = segments.get(3) {
            if !is_patch || !is_identifier(fourth) {
                return Err(malformed());
            }
        }
    }

    Ok((major, minor))
}

fn parse_digits(segment: &str) -> Option<u32> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_alphanumeric())
}

// build := alnum ( "." alnum+ )*
fn is_build_section(section: &str) -> bool {
    !section.is_empty() && section.split('.').all(is_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_forms() {
        for version in [
            "0.2",
            "0.3",
            "0.4",
            "0.3.0",
            "0.2.2",
            "0.2.2.dev20+g611e7a2.d20250719",
            "0.3.0-alpha.1",
            "0.2.0+build-extra",
        ] {
            assert!(is_supported(version), "expected {version:?} to be supported");
        }
    }

    #[test]
    fn rejects_malformed_forms() {
        for version in ["", "invalid", "0", "0.", "0.1..x", "0.2.x.y", "0.2.1.1.1", "0.2.-"] {
            assert!(
                matches!(major_minor(version), Err(GeffError::MalformedVersion(_))),
                "expected {version:?} to be malformed"
            );
        }
    }

    #[test]
    fn unsupported_versions_still_parse() {
        assert_eq!(major_minor("1.0").expect("parse"), (1, 0));
        assert!(!is_supported("1.0"));
        assert!(!is_supported("0.1"));
        assert!(matches!(
            check_supported("0.1.1"),
            Err(GeffError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn major_minor_ignores_patch_and_build() {
        assert_eq!(major_minor("0.2.2.dev20+g611e7a2.d20250719").expect("parse"), (0, 2));
        assert_eq!(major_minor("0.3.0-alpha.1").expect("parse"), (0, 3));
    }

    #[test]
    fn gate_is_invariant_under_build_metadata() {
        // Stripping build metadata never changes the verdict.
        for (full, stripped) in [
            ("0.2.2.dev20+g611e7a2.d20250719", "0.2.2.dev20"),
            ("0.3.0-alpha.1", "0.3.0"),
            ("1.0+x", "1.0"),
        ] {
            assert_eq!(is_supported(full), is_supported(stripped));
        }
    }
}
