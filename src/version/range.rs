//! Maven-style version range matching
//!
//! Supports the range specification grammar:
//! - `11.0.1+4` - a bare version, matched **exactly** (not "at least")
//! - `[1.0,2.0)` - inclusive lower, exclusive upper
//! - `(,1.0]` - unbounded lower
//! - `[1.5,)` - unbounded upper
//! - `[1.0]` - a single version in an inclusive restriction
//! - `(,1.0],[1.2,)` - a union of comma-joined restrictions
//!
//! Boundary versions are parsed with [`VersionParser`] in exact mode without the sanity check.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::{debug, warn};

use crate::version::error::RangeError;
use crate::version::model::VersionModel;
use crate::version::parser::VersionParser;

/// One bounded or half-bounded interval over versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restriction {
    lower: Option<VersionModel>,
    lower_inclusive: bool,
    upper: Option<VersionModel>,
    upper_inclusive: bool,
}

impl Restriction {
    pub fn new(
        lower: Option<VersionModel>,
        lower_inclusive: bool,
        upper: Option<VersionModel>,
        upper_inclusive: bool,
    ) -> Self {
        Self {
            lower,
            lower_inclusive,
            upper,
            upper_inclusive,
        }
    }

    /// `[version,version]`
    pub fn exact(version: VersionModel) -> Self {
        Self::new(Some(version.clone()), true, Some(version), true)
    }

    pub fn lower(&self) -> Option<&VersionModel> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&VersionModel> {
        self.upper.as_ref()
    }

    pub fn contains_version(&self, version: &VersionModel) -> bool {
        if let Some(lower) = &self.lower {
            match lower.cmp(version) {
                std::cmp::Ordering::Greater => return false,
                std::cmp::Ordering::Equal if !self.lower_inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match upper.cmp(version) {
                std::cmp::Ordering::Less => return false,
                std::cmp::Ordering::Equal if !self.upper_inclusive => return false,
                _ => {}
            }
        }
        true
    }

    /// Whether `next` starts before this restriction ends
    ///
    /// Restrictions sharing a boundary version do not overlap, whatever their inclusivity.
    fn overlaps_following(&self, next: &Restriction) -> bool {
        let (Some(upper), Some(next_lower)) = (&self.upper, &next.lower) else {
            return true;
        };
        next_lower < upper
    }
}

/// A parsed range specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSet {
    /// Union of ascending, non-overlapping restrictions
    Restrictions(Vec<Restriction>),
    /// Bare version; matches only a structurally equal version
    Exact(VersionModel),
}

impl RangeSet {
    /// Parse a range specification string
    pub fn create_from_spec(spec: &str, parser: &VersionParser) -> Result<Self, RangeError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(RangeError::Empty);
        }

        let mut restrictions: Vec<Restriction> = Vec::new();
        let mut process = spec;

        while process.starts_with('[') || process.starts_with('(') {
            let close = match (process.find(')'), process.find(']')) {
                (Some(paren), Some(bracket)) => paren.min(bracket),
                (Some(index), None) | (None, Some(index)) => index,
                (None, None) => {
                    return Err(RangeError::Unbounded {
                        spec: spec.to_string(),
                    });
                }
            };

            let restriction = parse_restriction(&process[..=close], parser)?;
            if restrictions
                .last()
                .is_some_and(|previous| previous.overlaps_following(&restriction))
            {
                return Err(RangeError::Overlap {
                    spec: spec.to_string(),
                });
            }
            restrictions.push(restriction);

            process = process[close + 1..].trim_start();
            if let Some(rest) = process.strip_prefix(',') {
                process = rest.trim_start();
            }
        }

        if process.is_empty() {
            return Ok(RangeSet::Restrictions(restrictions));
        }

        if !restrictions.is_empty() {
            return Err(RangeError::MixedSet {
                spec: spec.to_string(),
            });
        }

        let version = parser.parse(process, false, true)?;
        Ok(RangeSet::Exact(version.without_ignored_pre()))
    }

    /// Whether `version` satisfies this range
    ///
    /// The ignored pre-release tag is stripped first, so such a build matches any range that
    /// includes its eventual release.
    pub fn contains_version(&self, version: &VersionModel) -> bool {
        let version = version.without_ignored_pre();
        match self {
            RangeSet::Restrictions(restrictions) => restrictions
                .iter()
                .any(|restriction| restriction.contains_version(&version)),
            RangeSet::Exact(exact) => version == *exact,
        }
    }

    pub fn restrictions(&self) -> Vec<Restriction> {
        match self {
            RangeSet::Restrictions(restrictions) => restrictions.clone(),
            RangeSet::Exact(exact) => vec![Restriction::exact(exact.clone())],
        }
    }
}

/// Parse one bracketed restriction, brackets included
fn parse_restriction(spec: &str, parser: &VersionParser) -> Result<Restriction, RangeError> {
    let lower_inclusive = spec.starts_with('[');
    let upper_inclusive = spec.ends_with(']');
    let inner = spec[1..spec.len() - 1].trim();

    let Some((lower, upper)) = inner.split_once(',') else {
        if !lower_inclusive || !upper_inclusive {
            return Err(RangeError::SingleVersionNotInclusive {
                spec: spec.to_string(),
            });
        }
        let version = parser.parse(inner, false, true)?;
        return Ok(Restriction::exact(version));
    };

    let (lower, upper) = (lower.trim(), upper.trim());
    if lower == upper {
        return Err(RangeError::IdenticalBounds {
            spec: spec.to_string(),
        });
    }

    let parse_bound = |bound: &str| -> Result<Option<VersionModel>, RangeError> {
        if bound.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parser.parse(bound, false, true)?))
        }
    };
    let lower = parse_bound(lower)?;
    let upper = parse_bound(upper)?;

    if let (Some(lower), Some(upper)) = (&lower, &upper) {
        if upper < lower {
            return Err(RangeError::Inverted {
                spec: spec.to_string(),
            });
        }
    }

    Ok(Restriction::new(
        lower,
        lower_inclusive,
        upper,
        upper_inclusive,
    ))
}

/// Specs kept by [`RangeCache::new`]
pub const DEFAULT_RANGE_CACHE_CAPACITY: NonZeroUsize = NonZeroUsize::new(256).unwrap();

/// Memoizes parsed range specifications by their spec string
///
/// Owned by the query layer and shared by reference. Least recently used specs are evicted once
/// the capacity is reached; failed parses are not cached.
pub struct RangeCache {
    parser: VersionParser,
    entries: Mutex<LruCache<String, Arc<RangeSet>>>,
}

impl RangeCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RANGE_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            parser: VersionParser::new(),
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn create_from_spec(&self, spec: &str) -> Result<Arc<RangeSet>, RangeError> {
        let cached = self
            .entries
            .lock()
            .ok()
            .and_then(|mut entries| entries.get(spec).cloned());
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let range = Arc::new(RangeSet::create_from_spec(spec, &self.parser)?);
        debug!("Parsed range specification {:?}", spec);

        match self.entries.lock() {
            Ok(mut entries) => {
                entries.put(spec.to_string(), Arc::clone(&range));
            }
            Err(_) => warn!("Range cache lock poisoned, not caching {:?}", spec),
        }
        Ok(range)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RangeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::model::IGNORED_PRE_TAG;
    use rstest::rstest;

    fn no_patch() -> VersionModel {
        VersionModel::release(11, 0, 1, 4)
    }

    fn patch1() -> VersionModel {
        VersionModel::new(11, 0, 1, None, Some(1), 4, None, None)
    }

    fn patch2() -> VersionModel {
        VersionModel::new(11, 0, 1, None, Some(2), 4, None, None)
    }

    fn next_build() -> VersionModel {
        VersionModel::new(11, 0, 2, None, Some(1), 5, None, None)
    }

    fn range(spec: &str) -> RangeSet {
        RangeSet::create_from_spec(spec, &VersionParser::new()).unwrap()
    }

    #[rstest]
    #[case("[11.0.1.1,)", [false, true, true, true])]
    #[case("(,11.0.1.1+4)", [true, false, false, false])]
    #[case("(,11.0.1.1+4]", [true, true, false, false])]
    #[case("[11.0.1+4,11.0.2+5)", [true, true, true, false])]
    #[case("[11.0.2+4,)", [false, false, false, true])]
    #[case("11.0.1+4", [true, false, false, false])]
    #[case("[11.0.1+4]", [true, false, false, false])]
    #[case("(,11.0.1+4],[11.0.2+4,)", [true, false, false, true])]
    fn contains_version_matrix(#[case] spec: &str, #[case] expected: [bool; 4]) {
        let range = range(spec);
        let actual = [no_patch(), patch1(), patch2(), next_build()]
            .map(|version| range.contains_version(&version));

        assert_eq!(actual, expected, "spec {spec}");
    }

    #[rstest]
    #[case("", RangeError::Empty)]
    #[case("[1.0,2.0", RangeError::Unbounded { spec: "[1.0,2.0".to_string() })]
    #[case("[1.0,3.0],[2.0,4.0]", RangeError::Overlap { spec: "[1.0,3.0],[2.0,4.0]".to_string() })]
    #[case("[1.0,),[2.0,3.0]", RangeError::Overlap { spec: "[1.0,),[2.0,3.0]".to_string() })]
    #[case("[2.0,1.0]", RangeError::Inverted { spec: "[2.0,1.0]".to_string() })]
    #[case("[1.0,1.0]", RangeError::IdenticalBounds { spec: "[1.0,1.0]".to_string() })]
    #[case("(1.0)", RangeError::SingleVersionNotInclusive { spec: "(1.0)".to_string() })]
    #[case("[1.0,2.0),3.0", RangeError::MixedSet { spec: "[1.0,2.0),3.0".to_string() })]
    fn create_from_spec_rejects_malformed_specs(#[case] spec: &str, #[case] expected: RangeError) {
        assert_eq!(
            RangeSet::create_from_spec(spec, &VersionParser::new()),
            Err(expected)
        );
    }

    #[test]
    fn create_from_spec_rejects_unparseable_bounds() {
        let result = RangeSet::create_from_spec("[abc,)", &VersionParser::new());

        assert!(matches!(result, Err(RangeError::Version(_))));
    }

    #[rstest]
    #[case("[1.0,2.0),[2.0,3.0]")]
    #[case("[1.0,2.0],[2.0,3.0]")]
    #[case("[1.0,2.0],(2.0,3.0]")]
    fn restrictions_sharing_a_boundary_are_accepted(#[case] spec: &str) {
        let range = range(spec);
        let restrictions = range.restrictions();

        assert_eq!(restrictions.len(), 2);
        assert_eq!(restrictions[0].upper(), restrictions[1].lower());
        assert!(restrictions[0].lower() < restrictions[1].lower());
        assert!(range.contains_version(&VersionModel::release(2, 0, 0, 0)));
    }

    #[test]
    fn bare_version_is_an_exact_match_not_a_minimum() {
        let range = range("11.0.1+4");

        assert!(range.contains_version(&no_patch()));
        assert!(!range.contains_version(&VersionModel::release(11, 0, 9, 1)));
        assert!(!range.contains_version(&VersionModel::release(17, 0, 1, 1)));
    }

    #[test]
    fn ignored_pre_tag_is_stripped_before_containment() {
        let nightly = VersionModel::new(
            11,
            0,
            4,
            Some(IGNORED_PRE_TAG.to_string()),
            None,
            11,
            None,
            None,
        );

        assert!(range("[11.0.4+11,)").contains_version(&nightly));
        assert!(range("11.0.4+11").contains_version(&nightly));
    }

    #[test]
    fn other_pre_release_tags_sort_below_their_release() {
        let ea = VersionModel::new(11, 0, 4, Some("ea".to_string()), None, 11, None, None);

        assert!(!range("[11.0.4+11,)").contains_version(&ea));
        assert!(range("(,11.0.4+11)").contains_version(&ea));
    }

    #[test]
    fn range_cache_memoizes_by_spec_string() {
        let cache = RangeCache::new();

        let first = cache.create_from_spec("[11.0.1.1,)").unwrap();
        let second = cache.create_from_spec("[11.0.1.1,)").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn range_cache_evicts_least_recently_used_specs() {
        let cache = RangeCache::with_capacity(NonZeroUsize::new(2).unwrap());

        let oldest = cache.create_from_spec("[11.0.1.1,)").unwrap();
        let recent = cache.create_from_spec("(,11.0.1.1+4)").unwrap();
        cache.create_from_spec("[11.0.1.1,)").unwrap();
        cache.create_from_spec("[11.0.2+4,)").unwrap();

        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(
            &oldest,
            &cache.create_from_spec("[11.0.1.1,)").unwrap()
        ));
        assert!(!Arc::ptr_eq(
            &recent,
            &cache.create_from_spec("(,11.0.1.1+4)").unwrap()
        ));
    }

    #[test]
    fn range_cache_does_not_cache_failures() {
        let cache = RangeCache::new();

        assert!(cache.create_from_spec("[1.0,").is_err());
        assert!(cache.is_empty());
    }
}
