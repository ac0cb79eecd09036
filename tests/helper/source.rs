//! Release source test utilities

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use release_index::release::types::Release;
use release_index::release::{FeatureGroup, ReleaseIndex};
use release_index::store::{ReleaseDatabase, ReleaseSource, SourceError};

/// In-memory source whose reads can be made to fail
pub struct InMemorySource {
    groups: HashMap<u32, Vec<Release>>,
    failing: AtomicBool,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_releases(mut self, releases: Vec<Release>) -> Self {
        for release in releases {
            self.groups
                .entry(release.feature_version())
                .or_default()
                .push(release);
        }
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReleaseSource for InMemorySource {
    async fn read_release_data(&self, feature_version: u32) -> Result<FeatureGroup, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::LockPoisoned);
        }
        match self.groups.get(&feature_version) {
            Some(releases) => Ok(FeatureGroup::new(
                feature_version,
                ReleaseIndex::from_releases(releases.clone()),
            )),
            None => Err(SourceError::NotFound(feature_version)),
        }
    }
}

/// Create a test database with pre-populated releases
pub fn create_test_database(releases: &[Release]) -> (TempDir, ReleaseDatabase) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let database = ReleaseDatabase::new(&db_path).unwrap();
    database.upsert_releases(releases).unwrap();
    (temp_dir, database)
}
