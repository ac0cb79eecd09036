//! Free-form release name parser
//!
//! Release names published upstream are wildly inconsistent. The parser tries a small ordered set
//! of patterns, most specific first, and the first plausible match wins:
//!
//! - `13u-2019-10-30-23-10` - date-stamped nightly, the date becomes `optional` with `build=0`
//! - `1.8.0_212-b04` - pre-JEP-223 legacy string
//! - `8u212`, `jdk8u212-b03`, `jdk8u232-b09.1` - update-style identifiers
//! - `jdk-9.0.4+11`, `jdk-10.0.2+13.1`, `jdk-11.0.7-ea+9`, `jdk-13+33` - JEP 223 strings
//!
//! Source-control tag names arrive URL-encoded (`jdk-11.0.4%2B11`) and alternate JVM branding
//! (`_openj9-0.16.0`) is stripped before matching.

use std::borrow::Cow;
use std::ops::RangeInclusive;

use regex::{Captures, Regex};
use tracing::debug;

use crate::version::error::ParseError;
use crate::version::model::VersionModel;

/// Major versions considered plausible when the sanity check is enabled
pub const SANE_MAJOR_VERSIONS: RangeInclusive<u32> = 8..=99;

const NIGHTLY_PATTERN: &str =
    r"(?:jdk-?)?(?P<major>[1-9]\d*)u?-(?P<optional>\d{4}-\d{2}-\d{2}-\d{2}-\d{2})";

const LEGACY_PATTERN: &str =
    r"\b1\.(?P<major>[1-9])\.0_(?P<security>\d+)(?:-b(?P<build>\d+)(?:\.(?P<additional>\d+))?)?";

const UPDATE_PATTERN: &str =
    r"(?:jdk)?(?P<major>[1-9]\d*)u(?P<security>\d+)(?:-b(?P<build>\d+)(?:\.(?P<additional>\d+))?)?";

const JEP223_PATTERN: &str = concat!(
    r"(?:jdk-?)?(?P<major>[1-9]\d*)",
    r"(?:\.(?P<minor>\d+))?(?:\.(?P<security>\d+))?(?:\.(?P<patch>\d+))?",
    r"(?:-(?P<pre>[a-zA-Z][a-zA-Z0-9]*))?",
    r"(?:\+(?P<build>\d+)(?:\.(?P<additional>\d+))?)?",
    r"(?:-(?P<optional>[-a-zA-Z0-9.]+))?",
);

/// Keeps a scan from starting inside a dotted version or a `+build` number
const TOKEN_BOUNDARY: &str = r"(?:^|[^.\d+])";

const BRANDING_SUFFIX_PATTERN: &str = r"(?i)[_-](?:openj9|dragonwell)(?:[-_][0-9a-z.\-_]*)?$";

/// One pattern compiled for both scanning modes
struct VersionPattern {
    /// Matches anywhere in the input
    scan: Regex,
    /// Must match the entire input
    exact: Regex,
}

impl VersionPattern {
    fn new(pattern: &str) -> Self {
        Self {
            scan: Regex::new(pattern).unwrap(),
            exact: Regex::new(&format!("^(?:{pattern})$")).unwrap(),
        }
    }

    /// Scanning only starts at a token boundary
    fn bounded(pattern: &str) -> Self {
        Self {
            scan: Regex::new(&format!("{TOKEN_BOUNDARY}(?:{pattern})")).unwrap(),
            exact: Regex::new(&format!("^(?:{pattern})$")).unwrap(),
        }
    }
}

pub struct VersionParser {
    /// Tried in order; anchor tokens (`u-`, `_`, `u`, `+`) keep them mutually exclusive
    patterns: Vec<VersionPattern>,
    branding_suffix_re: Regex,
}

impl VersionParser {
    pub fn new() -> Self {
        Self {
            patterns: vec![
                VersionPattern::bounded(NIGHTLY_PATTERN),
                VersionPattern::new(LEGACY_PATTERN),
                VersionPattern::new(UPDATE_PATTERN),
                VersionPattern::new(JEP223_PATTERN),
            ],
            branding_suffix_re: Regex::new(BRANDING_SUFFIX_PATTERN).unwrap(),
        }
    }

    /// Parse a free-form string into a [`VersionModel`]
    ///
    /// # Arguments
    /// * `sanity_check` - reject candidates whose major version is outside
    ///   [`SANE_MAJOR_VERSIONS`]; disabled for range boundaries like `1.0`
    /// * `exact_match` - the whole (decoded, de-branded) input must be a version,
    ///   instead of scanning for the first version-like token
    pub fn parse(
        &self,
        input: &str,
        sanity_check: bool,
        exact_match: bool,
    ) -> Result<VersionModel, ParseError> {
        let decoded = url_decode(input.trim());
        let normalized = self.branding_suffix_re.replace(&decoded, "");
        let normalized = normalized.trim();

        for pattern in &self.patterns {
            let found = if exact_match {
                pattern
                    .exact
                    .captures(normalized)
                    .and_then(|caps| extract(&caps))
                    .filter(|version| !sanity_check || is_sane(version))
            } else {
                pattern
                    .scan
                    .captures_iter(normalized)
                    .filter_map(|caps| extract(&caps))
                    .find(|version| !sanity_check || is_sane(version))
            };

            if let Some(version) = found {
                debug!("Parsed {:?} as {}", input, version);
                return Ok(version);
            }
        }

        Err(ParseError::new(input))
    }

    /// Parse an upstream release name with the sanity check enabled
    pub fn parse_release_name(&self, input: &str) -> Result<VersionModel, ParseError> {
        self.parse(input, true, false)
    }
}

impl Default for VersionParser {
    fn default() -> Self {
        Self::new()
    }
}

fn url_decode(input: &str) -> Cow<'_, str> {
    if !input.contains('%') {
        return Cow::Borrowed(input);
    }
    urlencoding::decode(input).unwrap_or(Cow::Borrowed(input))
}

fn is_sane(version: &VersionModel) -> bool {
    SANE_MAJOR_VERSIONS.contains(&version.major)
}

/// Build a version from whichever named groups the pattern defines
///
/// Returns None when a numeric group overflows.
fn extract(caps: &Captures<'_>) -> Option<VersionModel> {
    let number = |name: &str| -> Option<Option<u32>> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().ok().map(Some),
            None => Some(None),
        }
    };
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    let major = number("major")??;
    let minor = number("minor")?.unwrap_or(0);
    let security = number("security")?.unwrap_or(0);
    let patch = number("patch")?;
    let build = number("build")?.unwrap_or(0);
    let additional = number("additional")?;

    Some(VersionModel::new(
        major,
        minor,
        security,
        text("pre"),
        patch,
        build,
        additional,
        text("optional"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(input: &str) -> VersionModel {
        VersionParser::new().parse_release_name(input).unwrap()
    }

    #[rstest]
    #[case("OpenJDK 8u212 GA Release", 8, 0, 212, 0, "8.0.212")]
    #[case("8u212", 8, 0, 212, 0, "8.0.212")]
    #[case("jdk8u212-b03", 8, 0, 212, 3, "8.0.212+3")]
    #[case("jdk8u232-b09.1", 8, 0, 232, 9, "8.0.232+9.1")]
    #[case("jdk8u212-b04_openj9-0.14.0", 8, 0, 212, 4, "8.0.212+4")]
    #[case("1.8.0_212-b04", 8, 0, 212, 4, "8.0.212+4")]
    #[case("jdk-9.0.4+11", 9, 0, 4, 11, "9.0.4+11")]
    #[case("jdk-10.0.2+13.1", 10, 0, 2, 13, "10.0.2+13.1")]
    #[case("jdk-13+33", 13, 0, 0, 33, "13.0.0+33")]
    #[case("jdk-13+33_openj9-0.16.0", 13, 0, 0, 33, "13.0.0+33")]
    #[case("jdk-11.0.4%2B11", 11, 0, 4, 11, "11.0.4+11")]
    #[case("jdk-11.0.7-ea+9", 11, 0, 7, 9, "11.0.7-ea+9")]
    #[case("jdk-11.0.1.1+4", 11, 0, 1, 4, "11.0.1.1+4")]
    #[case("13u-2019-10-30-23-10", 13, 0, 0, 0, "13.0.0+0.2019-10-30-23-10")]
    #[case("jdk11u-2019-10-30-23-10", 11, 0, 0, 0, "11.0.0+0.2019-10-30-23-10")]
    #[case("jdk-11.0.4+11-2019-10-30-23-10", 11, 0, 4, 11, "11.0.4+11.2019-10-30-23-10")]
    fn parse_returns_expected_version(
        #[case] input: &str,
        #[case] major: u32,
        #[case] minor: u32,
        #[case] security: u32,
        #[case] build: u32,
        #[case] canonical: &str,
    ) {
        let version = parse(input);

        assert_eq!(version.major, major);
        assert_eq!(version.minor, minor);
        assert_eq!(version.security, security);
        assert_eq!(version.build, build);
        assert_eq!(version.canonical, canonical);
    }

    #[test]
    fn parse_extracts_all_fields_in_one_pass() {
        assert_eq!(
            parse("jdk-10.0.2+13.1"),
            VersionModel::new(10, 0, 2, None, None, 13, Some(1), None)
        );
        assert_eq!(
            parse("jdk-11.0.7-ea+9"),
            VersionModel::new(11, 0, 7, Some("ea".to_string()), None, 9, None, None)
        );
        assert_eq!(
            parse("jdk-11.0.1.1+4"),
            VersionModel::new(11, 0, 1, None, Some(1), 4, None, None)
        );
    }

    #[test]
    fn nightly_date_becomes_optional_with_zero_build() {
        let version = parse("13u-2019-10-30-23-10");

        assert_eq!(version.optional.as_deref(), Some("2019-10-30-23-10"));
        assert_eq!(version.build, 0);
        assert_eq!(version.pre, None);
    }

    #[test]
    fn dated_jep223_name_keeps_security_and_build() {
        let version = parse("jdk-11.0.4+11-2019-10-30-23-10");

        assert_eq!(
            version,
            VersionModel::new(
                11,
                0,
                4,
                None,
                None,
                11,
                None,
                Some("2019-10-30-23-10".to_string())
            )
        );
        assert!(version > parse("jdk-11.0.4+10"));
    }

    #[rstest]
    #[case("")]
    #[case("no version here")]
    #[case("jdk-")]
    fn parse_fails_without_version_pattern(#[case] input: &str) {
        let result = VersionParser::new().parse_release_name(input);

        assert_eq!(result, Err(ParseError::new(input)));
    }

    #[test]
    fn sanity_check_rejects_implausible_major_versions() {
        let parser = VersionParser::new();

        assert!(parser.parse("1.0", true, true).is_err());
        assert_eq!(parser.parse("1.0", false, true).unwrap().major, 1);
    }

    #[test]
    fn scanning_skips_implausible_candidates() {
        let version = parse("build 2020 of jdk-11.0.4+11");

        assert_eq!(version.canonical, "11.0.4+11");
    }

    #[rstest]
    #[case("OpenJDK 8u212 GA Release")]
    #[case("jdk-11.0.4+11 release")]
    fn exact_match_rejects_surrounding_text(#[case] input: &str) {
        let parser = VersionParser::new();

        assert!(parser.parse(input, true, true).is_err());
        assert!(parser.parse(input, true, false).is_ok());
    }

    #[test]
    fn exact_match_parses_range_boundaries() {
        let parser = VersionParser::new();

        assert_eq!(
            parser.parse("11.0.1.1", false, true).unwrap(),
            VersionModel::new(11, 0, 1, None, Some(1), 0, None, None)
        );
        assert_eq!(
            parser.parse("11.0.2+5", false, true).unwrap(),
            VersionModel::release(11, 0, 2, 5)
        );
    }
}
