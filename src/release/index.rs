//! Immutable, dual-ordered release collection
//!
//! A [`ReleaseIndex`] keeps every release reachable by id and through two total orderings over
//! the same membership:
//!
//! - by version: version -> published time -> name -> id
//! - by time: published time -> version -> name -> id
//!
//! The shared `name`, `id` suffix makes both orderings deterministic and duplicate free.
//! `add`, `remove`, `retain` and `filter_binaries` return a new index; releases themselves are
//! shared between indexes through `Arc`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::release::types::{Binary, Release, UnknownValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UnknownValue {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMethod {
    #[default]
    ByVersion,
    ByTime,
}

impl FromStr for SortMethod {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "version" => Ok(SortMethod::ByVersion),
            "time" => Ok(SortMethod::ByTime),
            _ => Err(UnknownValue {
                kind: "sort method",
                value: s.to_string(),
            }),
        }
    }
}

fn compare_by_version(a: &Release, b: &Release) -> Ordering {
    a.version_data
        .cmp(&b.version_data)
        .then(a.timestamp.cmp(&b.timestamp))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_by_time(a: &Release, b: &Release) -> Ordering {
    a.timestamp
        .cmp(&b.timestamp)
        .then_with(|| a.version_data.cmp(&b.version_data))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Comparator used by [`ReleaseIndex::get_ordered`] for a sort method
pub fn comparator(method: SortMethod) -> fn(&Release, &Release) -> Ordering {
    match method {
        SortMethod::ByVersion => compare_by_version,
        SortMethod::ByTime => compare_by_time,
    }
}

#[derive(Debug, Clone)]
struct ByVersion(Arc<Release>);

impl Ord for ByVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_by_version(&self.0, &other.0)
    }
}

impl PartialOrd for ByVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByVersion {}

#[derive(Debug, Clone)]
struct ByTime(Arc<Release>);

impl Ord for ByTime {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_by_time(&self.0, &other.0)
    }
}

impl PartialOrd for ByTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ByTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ByTime {}

#[derive(Debug, Clone, Default)]
pub struct ReleaseIndex {
    releases: BTreeMap<String, Arc<Release>>,
    by_version: BTreeSet<ByVersion>,
    by_time: BTreeSet<ByTime>,
}

impl ReleaseIndex {
    /// Build an index; a later release with an already seen id replaces the earlier one
    pub fn from_releases<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = Release>,
    {
        Self::from_shared(releases.into_iter().map(Arc::new))
    }

    pub fn from_shared<I>(releases: I) -> Self
    where
        I: IntoIterator<Item = Arc<Release>>,
    {
        let releases: BTreeMap<String, Arc<Release>> = releases
            .into_iter()
            .map(|release| (release.id.clone(), release))
            .collect();
        Self::from_map(releases)
    }

    fn from_map(releases: BTreeMap<String, Arc<Release>>) -> Self {
        let by_version = releases.values().cloned().map(ByVersion).collect();
        let by_time = releases.values().cloned().map(ByTime).collect();
        Self {
            releases,
            by_version,
            by_time,
        }
    }

    /// Iterate in the requested order
    ///
    /// The iterator is lazy and borrows the index; call again to restart.
    pub fn get_ordered(
        &self,
        order: SortOrder,
        method: SortMethod,
    ) -> Box<dyn Iterator<Item = &Arc<Release>> + '_> {
        match (method, order) {
            (SortMethod::ByVersion, SortOrder::Asc) => {
                Box::new(self.by_version.iter().map(|r| &r.0))
            }
            (SortMethod::ByVersion, SortOrder::Desc) => {
                Box::new(self.by_version.iter().rev().map(|r| &r.0))
            }
            (SortMethod::ByTime, SortOrder::Asc) => Box::new(self.by_time.iter().map(|r| &r.0)),
            (SortMethod::ByTime, SortOrder::Desc) => {
                Box::new(self.by_time.iter().rev().map(|r| &r.0))
            }
        }
    }

    /// New index with `releases` inserted, replacing any release with the same id
    pub fn add<I>(&self, releases: I) -> Self
    where
        I: IntoIterator<Item = Release>,
    {
        let mut map = self.releases.clone();
        for release in releases {
            map.insert(release.id.clone(), Arc::new(release));
        }
        Self::from_map(map)
    }

    /// New index without the release `id`
    pub fn remove(&self, id: &str) -> Self {
        if !self.releases.contains_key(id) {
            return self.clone();
        }
        let mut map = self.releases.clone();
        map.remove(id);
        Self::from_map(map)
    }

    /// New index keeping only the releases whose id is in `ids`
    pub fn retain<'a, I>(&self, ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let ids: HashSet<&str> = ids.into_iter().collect();
        let map = self
            .releases
            .iter()
            .filter(|(id, _)| ids.contains(id.as_str()))
            .map(|(id, release)| (id.clone(), Arc::clone(release)))
            .collect();
        Self::from_map(map)
    }

    /// New index where every release keeps only matching binaries; emptied releases are dropped
    pub fn filter_binaries<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Binary) -> bool,
    {
        let map = self
            .releases
            .iter()
            .filter_map(|(id, release)| {
                if release.binaries.is_empty() {
                    return None;
                }
                if release.binaries.iter().all(&predicate) {
                    return Some((id.clone(), Arc::clone(release)));
                }
                let filtered = release.retain_binaries(&predicate);
                (!filtered.binaries.is_empty()).then(|| (id.clone(), Arc::new(filtered)))
            })
            .collect();
        Self::from_map(map)
    }

    pub fn has_release_id(&self, id: &str) -> bool {
        self.releases.contains_key(id)
    }

    /// Whether the indexed copy of `id` is older than `updated_at`
    ///
    /// Returns false for unknown ids; check [`Self::has_release_id`] first when diffing.
    pub fn has_been_updated_since(&self, id: &str, updated_at: DateTime<Utc>) -> bool {
        self.releases
            .get(id)
            .is_some_and(|release| release.updated_at < updated_at)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Release>> {
        self.releases.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.releases.keys().map(String::as_str)
    }

    /// Releases in id order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Release>> {
        self.releases.values()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl PartialEq for ReleaseIndex {
    fn eq(&self, other: &Self) -> bool {
        self.releases == other.releases
    }
}

impl Eq for ReleaseIndex {}

impl FromIterator<Release> for ReleaseIndex {
    fn from_iter<T: IntoIterator<Item = Release>>(iter: T) -> Self {
        Self::from_releases(iter)
    }
}
