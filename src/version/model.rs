//! Canonical structured version of a release
//!
//! A [`VersionModel`] is what every free-form release name is normalised into. Equality is
//! structural over every field, while ordering follows the release line semantics:
//!
//! ```text
//! major -> minor -> security -> patch -> pre (absent last) -> build -> additional build number
//! ```
//!
//! The [`IGNORED_PRE_TAG`] is treated as absent when ordering, so two versions differing only by
//! that tag rank equal without being `==`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pre-release tag carried by alternate-JVM nightly builds that must not affect ordering
pub const IGNORED_PRE_TAG: &str = "beta";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionModel {
    pub major: u32,
    pub minor: u32,
    pub security: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_build_number: Option<u32>,
    #[serde(default)]
    pub build: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<String>,
    #[serde(rename = "semver")]
    pub canonical: String,
}

impl VersionModel {
    /// Build a version and compute its canonical string
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        major: u32,
        minor: u32,
        security: u32,
        pre: Option<String>,
        patch: Option<u32>,
        build: u32,
        additional_build_number: Option<u32>,
        optional: Option<String>,
    ) -> Self {
        let canonical = render_canonical(
            major,
            minor,
            security,
            patch,
            pre.as_deref(),
            build,
            additional_build_number,
            optional.as_deref(),
        );
        Self {
            major,
            minor,
            security,
            pre,
            patch,
            additional_build_number,
            build,
            optional,
            canonical,
        }
    }

    /// Shorthand for a plain `major.minor.security+build` version
    pub fn release(major: u32, minor: u32, security: u32, build: u32) -> Self {
        Self::new(major, minor, security, None, None, build, None, None)
    }

    pub fn is_pre_release(&self) -> bool {
        self.ordering_pre().is_some()
    }

    /// Copy of this version with the ignored pre-release tag removed
    ///
    /// Any other pre-release tag is kept as is.
    pub fn without_ignored_pre(&self) -> Self {
        if self.pre.as_deref() != Some(IGNORED_PRE_TAG) {
            return self.clone();
        }
        Self::new(
            self.major,
            self.minor,
            self.security,
            None,
            self.patch,
            self.build,
            self.additional_build_number,
            self.optional.clone(),
        )
    }

    fn ordering_pre(&self) -> Option<&str> {
        self.pre.as_deref().filter(|pre| *pre != IGNORED_PRE_TAG)
    }
}

#[allow(clippy::too_many_arguments)]
fn render_canonical(
    major: u32,
    minor: u32,
    security: u32,
    patch: Option<u32>,
    pre: Option<&str>,
    build: u32,
    additional_build_number: Option<u32>,
    optional: Option<&str>,
) -> String {
    let mut canonical = format!("{major}.{minor}.{security}");
    if let Some(patch) = patch {
        canonical.push_str(&format!(".{patch}"));
    }
    if let Some(pre) = pre {
        canonical.push_str(&format!("-{pre}"));
    }
    if build > 0 || additional_build_number.is_some() || optional.is_some() {
        canonical.push_str(&format!("+{build}"));
        if let Some(additional) = additional_build_number {
            canonical.push_str(&format!(".{additional}"));
        }
        if let Some(optional) = optional {
            canonical.push_str(&format!(".{optional}"));
        }
    }
    canonical
}

/// Absent pre-release tags sort after present ones: a pre-release precedes its release
fn compare_pre(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

impl Ord for VersionModel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.security.cmp(&other.security))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_pre(self.ordering_pre(), other.ordering_pre()))
            .then(self.build.cmp(&other.build))
            .then(
                self.additional_build_number
                    .cmp(&other.additional_build_number),
            )
    }
}

impl PartialOrd for VersionModel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
