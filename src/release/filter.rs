//! Release-level and binary-level query predicates
//!
//! Every field is optional: an absent field places no constraint, present fields are ANDed.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::release::types::{
    Architecture, Binary, HeapSize, ImageType, JvmVariant, Os, Project, Release, ReleaseKind,
    Vendor,
};
use crate::version::range::RangeSet;

#[derive(Debug, Clone, Default)]
pub struct ReleaseFilter {
    pub release_kind: Option<ReleaseKind>,
    pub feature_version: Option<u32>,
    pub release_name: Option<String>,
    pub vendor: Option<Vendor>,
    /// `Some(true)` keeps only LTS lines, `Some(false)` only non-LTS lines
    pub lts: Option<bool>,
    /// Major versions designated LTS; consulted only when `lts` is set
    pub lts_versions: Vec<u32>,
    pub version_range: Option<Arc<RangeSet>>,
}

impl ReleaseFilter {
    /// Filter without constraints that knows the configured LTS versions
    pub fn new(lts_versions: &[u32]) -> Self {
        Self {
            lts_versions: lts_versions.to_vec(),
            ..Default::default()
        }
    }

    pub fn matches(&self, release: &Release) -> bool {
        self.release_kind
            .is_none_or(|kind| release.release_kind == kind)
            && self
                .feature_version
                .is_none_or(|version| release.feature_version() == version)
            && self
                .release_name
                .as_deref()
                .is_none_or(|name| release.name == name)
            && self.vendor.is_none_or(|vendor| release.vendor == vendor)
            && self.lts.is_none_or(|lts| {
                self.lts_versions.contains(&release.feature_version()) == lts
            })
            && self
                .version_range
                .as_deref()
                .is_none_or(|range| range.contains_version(&release.version_data))
    }
}

#[derive(Debug, Clone, Default)]
pub struct BinaryFilter {
    pub os: Option<Os>,
    pub architecture: Option<Architecture>,
    pub image_type: Option<ImageType>,
    pub jvm_variant: Option<JvmVariant>,
    pub heap_size: Option<HeapSize>,
    /// Defaults to [`Project::PRIMARY`] when absent
    pub project: Option<Project>,
    /// Keep only binaries updated strictly before this instant
    pub updated_before: Option<DateTime<Utc>>,
}

impl BinaryFilter {
    pub fn matches(&self, binary: &Binary) -> bool {
        self.os.is_none_or(|os| binary.os == os)
            && self
                .architecture
                .is_none_or(|architecture| binary.architecture == architecture)
            && self
                .image_type
                .is_none_or(|image_type| binary.image_type == image_type)
            && self
                .jvm_variant
                .is_none_or(|jvm_variant| binary.jvm_variant == jvm_variant)
            && self
                .heap_size
                .is_none_or(|heap_size| binary.heap_size == heap_size)
            && binary.project == self.project.unwrap_or(Project::PRIMARY)
            && self
                .updated_before
                .is_none_or(|cutoff| binary.updated_at < cutoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::types::fixtures::{at, binary, release};
    use crate::version::parser::VersionParser;
    use rstest::rstest;

    fn range(spec: &str) -> Arc<RangeSet> {
        Arc::new(RangeSet::create_from_spec(spec, &VersionParser::new()).unwrap())
    }

    #[test]
    fn empty_filters_match_everything_on_the_primary_project() {
        let release = release("r1", "jdk-11.0.4+11", 1);

        assert!(ReleaseFilter::default().matches(&release));
        assert!(BinaryFilter::default().matches(&release.binaries[0]));
    }

    #[rstest]
    #[case(ReleaseFilter { release_kind: Some(ReleaseKind::Ea), ..Default::default() }, false)]
    #[case(ReleaseFilter { release_kind: Some(ReleaseKind::Ga), ..Default::default() }, true)]
    #[case(ReleaseFilter { feature_version: Some(17), ..Default::default() }, false)]
    #[case(ReleaseFilter { feature_version: Some(11), ..Default::default() }, true)]
    #[case(ReleaseFilter { release_name: Some("jdk-11.0.4+11".to_string()), ..Default::default() }, true)]
    #[case(ReleaseFilter { release_name: Some("jdk-11.0.5+10".to_string()), ..Default::default() }, false)]
    #[case(ReleaseFilter { vendor: Some(Vendor::Alibaba), ..Default::default() }, false)]
    #[case(ReleaseFilter { lts: Some(true), ..ReleaseFilter::new(&[8, 11, 17]) }, true)]
    #[case(ReleaseFilter { lts: Some(false), ..ReleaseFilter::new(&[8, 11, 17]) }, false)]
    #[case(ReleaseFilter { lts: Some(true), ..ReleaseFilter::new(&[8, 17]) }, false)]
    #[case(ReleaseFilter { version_range: Some(range("[11.0.4+11,)")), ..Default::default() }, true)]
    #[case(ReleaseFilter { version_range: Some(range("(,11.0.4+11)")), ..Default::default() }, false)]
    #[case(ReleaseFilter { version_range: Some(range("11.0.4+11")), ..Default::default() }, true)]
    fn release_filter_matches_expected(#[case] filter: ReleaseFilter, #[case] expected: bool) {
        assert_eq!(filter.matches(&release("r1", "jdk-11.0.4+11", 1)), expected);
    }

    #[test]
    fn release_filter_requires_every_present_field() {
        let filter = ReleaseFilter {
            release_kind: Some(ReleaseKind::Ga),
            feature_version: Some(11),
            vendor: Some(Vendor::Alibaba),
            ..Default::default()
        };

        assert!(!filter.matches(&release("r1", "jdk-11.0.4+11", 1)));
    }

    #[rstest]
    #[case(BinaryFilter { os: Some(Os::Linux), ..Default::default() }, true)]
    #[case(BinaryFilter { os: Some(Os::Mac), ..Default::default() }, false)]
    #[case(BinaryFilter { architecture: Some(Architecture::X64), ..Default::default() }, true)]
    #[case(BinaryFilter { image_type: Some(ImageType::Jre), ..Default::default() }, false)]
    #[case(BinaryFilter { jvm_variant: Some(JvmVariant::OpenJ9), ..Default::default() }, false)]
    #[case(BinaryFilter { heap_size: Some(HeapSize::Normal), ..Default::default() }, true)]
    #[case(BinaryFilter { project: Some(Project::Valhalla), ..Default::default() }, false)]
    #[case(BinaryFilter { updated_before: Some(at(2)), ..Default::default() }, true)]
    #[case(BinaryFilter { updated_before: Some(at(1)), ..Default::default() }, false)]
    fn binary_filter_matches_expected(#[case] filter: BinaryFilter, #[case] expected: bool) {
        let binary = binary(Os::Linux, Architecture::X64, ImageType::Jdk);

        assert_eq!(filter.matches(&binary), expected);
    }

    #[test]
    fn binary_filter_excludes_non_primary_projects_by_default() {
        let mut valhalla = binary(Os::Linux, Architecture::X64, ImageType::Jdk);
        valhalla.project = Project::Valhalla;

        assert!(!BinaryFilter::default().matches(&valhalla));
        assert!(
            BinaryFilter {
                project: Some(Project::Valhalla),
                ..Default::default()
            }
            .matches(&valhalla)
        );
    }
}
