//! Feature groups and the repository snapshot built from them
//!
//! A [`RepositorySnapshot`] is assembled wholesale from one [`FeatureGroup`] per major version
//! and never edited afterwards. `all_releases` is always recomputed from the groups.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::release::error::SnapshotError;
use crate::release::filter::{BinaryFilter, ReleaseFilter};
use crate::release::index::{ReleaseIndex, SortMethod, SortOrder};
use crate::release::types::{
    Architecture, Binary, HeapSize, ImageType, JvmVariant, Os, Release, ReleaseKind,
};
use crate::version::model::VersionModel;

/// Releases of one major version line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureGroup {
    pub feature_version: u32,
    pub releases: ReleaseIndex,
}

impl FeatureGroup {
    pub fn new(feature_version: u32, releases: ReleaseIndex) -> Self {
        Self {
            feature_version,
            releases,
        }
    }

    /// Verify every release's major version matches this group's feature version
    pub fn check_consistency(&self) -> Result<(), SnapshotError> {
        match self
            .releases
            .iter()
            .find(|release| release.feature_version() != self.feature_version)
        {
            Some(release) => Err(SnapshotError::FeatureVersionMismatch {
                feature_version: self.feature_version,
                release_id: release.id.clone(),
                major: release.feature_version(),
            }),
            None => Ok(()),
        }
    }
}

/// Summary of the release lines present in a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailableReleases {
    /// Feature versions with at least one GA release
    pub available_releases: Vec<u32>,
    pub available_lts_releases: Vec<u32>,
    pub most_recent_lts: Option<u32>,
    pub most_recent_feature_release: Option<u32>,
    /// Newest feature version with any release, early access included
    pub most_recent_feature_version: Option<u32>,
}

/// Newest binary for one platform combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestBinary {
    pub release_id: String,
    pub release_name: String,
    pub version: VersionModel,
    pub binary: Binary,
}

type PlatformKey = (Os, Architecture, ImageType, JvmVariant, HeapSize);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    groups: BTreeMap<u32, FeatureGroup>,
    all_releases: ReleaseIndex,
}

impl RepositorySnapshot {
    /// Build a snapshot; a later group for an already seen feature version replaces the earlier
    pub fn from_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = FeatureGroup>,
    {
        let groups: BTreeMap<u32, FeatureGroup> = groups
            .into_iter()
            .map(|group| (group.feature_version, group))
            .collect();
        let all_releases = ReleaseIndex::from_shared(
            groups
                .values()
                .flat_map(|group| group.releases.iter().cloned()),
        );
        Self {
            groups,
            all_releases,
        }
    }

    pub fn get_feature_group(&self, feature_version: u32) -> Option<&FeatureGroup> {
        self.groups.get(&feature_version)
    }

    pub fn feature_versions(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    pub fn groups(&self) -> impl Iterator<Item = &FeatureGroup> {
        self.groups.values()
    }

    /// Flattened union of every group
    pub fn all_releases(&self) -> &ReleaseIndex {
        &self.all_releases
    }

    /// Ordered releases of one feature version; empty when the group does not exist
    pub fn get_releases(
        &self,
        feature_version: u32,
        order: SortOrder,
        method: SortMethod,
    ) -> impl Iterator<Item = &Arc<Release>> {
        self.groups
            .get(&feature_version)
            .into_iter()
            .flat_map(move |group| group.releases.get_ordered(order, method))
    }

    /// Releases matching `release_filter`, each narrowed to binaries matching `binary_filter`
    ///
    /// Releases left with no binaries are dropped. The sequence keeps the requested ordering and
    /// is lazy, so consumers may stop early.
    pub fn get_filtered_releases<'a>(
        &'a self,
        release_filter: &'a ReleaseFilter,
        binary_filter: &'a BinaryFilter,
        order: SortOrder,
        method: SortMethod,
    ) -> impl Iterator<Item = Arc<Release>> + 'a {
        let source = match release_filter.feature_version {
            Some(feature_version) => self.groups.get(&feature_version).map(|g| &g.releases),
            None => Some(&self.all_releases),
        };

        source
            .into_iter()
            .flat_map(move |index| index.get_ordered(order, method))
            .filter(move |release| release_filter.matches(release))
            .filter_map(move |release| {
                if release.binaries.iter().all(|b| binary_filter.matches(b)) {
                    return (!release.binaries.is_empty()).then(|| Arc::clone(release));
                }
                let narrowed = release.retain_binaries(|b| binary_filter.matches(b));
                (!narrowed.binaries.is_empty()).then(|| Arc::new(narrowed))
            })
    }

    /// Names of the matching releases, in order
    pub fn release_names<'a>(
        &'a self,
        release_filter: &'a ReleaseFilter,
        binary_filter: &'a BinaryFilter,
        order: SortOrder,
        method: SortMethod,
    ) -> impl Iterator<Item = String> + 'a {
        self.get_filtered_releases(release_filter, binary_filter, order, method)
            .map(|release| release.name.clone())
    }

    /// Versions of the matching releases, in order
    pub fn release_versions<'a>(
        &'a self,
        release_filter: &'a ReleaseFilter,
        binary_filter: &'a BinaryFilter,
        order: SortOrder,
        method: SortMethod,
    ) -> impl Iterator<Item = VersionModel> + 'a {
        self.get_filtered_releases(release_filter, binary_filter, order, method)
            .map(|release| release.version_data.clone())
    }

    /// New snapshot with `release` added to the group for `feature_version`
    pub fn with_added_release(
        &self,
        feature_version: u32,
        release: Release,
    ) -> Result<Self, SnapshotError> {
        if release.feature_version() != feature_version {
            return Err(SnapshotError::FeatureVersionMismatch {
                feature_version,
                release_id: release.id,
                major: release.version_data.major,
            });
        }

        let releases = match self.groups.get(&feature_version) {
            Some(group) => group.releases.add([release]),
            None => ReleaseIndex::from_releases([release]),
        };
        Ok(self.with_group(FeatureGroup::new(feature_version, releases)))
    }

    /// New snapshot without release `id` in the group for `feature_version`
    pub fn with_removed_release(&self, feature_version: u32, id: &str) -> Self {
        match self.groups.get(&feature_version) {
            Some(group) if group.releases.has_release_id(id) => self.with_group(FeatureGroup::new(
                feature_version,
                group.releases.remove(id),
            )),
            _ => self.clone(),
        }
    }

    fn with_group(&self, group: FeatureGroup) -> Self {
        let mut groups = self.groups.clone();
        groups.insert(group.feature_version, group);
        Self::from_groups(groups.into_values())
    }

    pub fn available_releases(&self, lts_versions: &[u32]) -> AvailableReleases {
        let has_ga = |group: &FeatureGroup| {
            group
                .releases
                .iter()
                .any(|release| release.release_kind == ReleaseKind::Ga)
        };

        let available_releases: Vec<u32> = self
            .groups
            .values()
            .filter(|group| has_ga(group))
            .map(|group| group.feature_version)
            .collect();
        let available_lts_releases: Vec<u32> = available_releases
            .iter()
            .copied()
            .filter(|version| lts_versions.contains(version))
            .collect();

        AvailableReleases {
            most_recent_lts: available_lts_releases.last().copied(),
            most_recent_feature_release: available_releases.last().copied(),
            most_recent_feature_version: self
                .groups
                .values()
                .rev()
                .find(|group| !group.releases.is_empty())
                .map(|group| group.feature_version),
            available_releases,
            available_lts_releases,
        }
    }

    /// Newest GA binary per platform combination within one feature version
    pub fn latest_binaries(
        &self,
        feature_version: u32,
        binary_filter: &BinaryFilter,
    ) -> Vec<LatestBinary> {
        let mut latest: BTreeMap<PlatformKey, LatestBinary> = BTreeMap::new();

        let releases = self
            .get_releases(feature_version, SortOrder::Desc, SortMethod::ByVersion)
            .filter(|release| release.release_kind == ReleaseKind::Ga);
        for release in releases {
            for binary in release.binaries.iter().filter(|b| binary_filter.matches(b)) {
                let key = (
                    binary.os,
                    binary.architecture,
                    binary.image_type,
                    binary.jvm_variant,
                    binary.heap_size,
                );
                latest.entry(key).or_insert_with(|| LatestBinary {
                    release_id: release.id.clone(),
                    release_name: release.name.clone(),
                    version: release.version_data.clone(),
                    binary: binary.clone(),
                });
            }
        }

        latest.into_values().collect()
    }
}
