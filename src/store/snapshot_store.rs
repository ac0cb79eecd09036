//! Current snapshot holder with atomic publication
//!
//! Readers take an `Arc` to the snapshot that is current at the time of the call and keep a
//! consistent view for as long as they hold it. Writers publish a fully built snapshot with a
//! single pointer swap and never block readers.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::release::snapshot::RepositorySnapshot;

pub struct SnapshotStore {
    snap: ArcSwap<RepositorySnapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: RepositorySnapshot) -> Self {
        Self {
            snap: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The snapshot visible to new readers
    pub fn current(&self) -> Arc<RepositorySnapshot> {
        self.snap.load_full()
    }

    /// Publish `snapshot`, returning the one it replaced
    pub fn swap(&self, snapshot: RepositorySnapshot) -> Arc<RepositorySnapshot> {
        self.snap.swap(Arc::new(snapshot))
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(RepositorySnapshot::default())
    }
}
