//! Background refresh of the published repository snapshot
//!
//! A cycle reads every tracked feature version from the [`ReleaseSource`], assembles a new
//! [`RepositorySnapshot`] off to the side and publishes it with one swap. Any failed read or
//! inconsistent group abandons the cycle and leaves the current snapshot in place.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::IndexConfig;
use crate::release::index::ReleaseIndex;
use crate::release::snapshot::{FeatureGroup, RepositorySnapshot};
use crate::release::types::Release;
use crate::store::error::{RefreshError, SourceError};
use crate::store::snapshot_store::SnapshotStore;
use crate::store::source::ReleaseSource;

/// Smallest period accepted by the scheduling loop; `interval` panics on zero
const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Read one feature version and validate it
///
/// A group missing from the source yields `Ok(None)`.
async fn read_feature_group(
    source: &dyn ReleaseSource,
    feature_version: u32,
    delay: Duration,
) -> Result<Option<FeatureGroup>, RefreshError> {
    sleep(delay).await;

    match source.read_release_data(feature_version).await {
        Ok(group) => {
            let group = FeatureGroup::new(feature_version, group.releases);
            group.check_consistency()?;
            debug!(
                "Read {} releases for feature version {}",
                group.releases.len(),
                feature_version
            );
            Ok(Some(group))
        }
        Err(SourceError::NotFound(_)) => {
            debug!("No releases stored for feature version {}", feature_version);
            Ok(None)
        }
        Err(e) => Err(RefreshError::Source {
            feature_version,
            source: e,
        }),
    }
}

/// Assemble a snapshot from every configured feature version
///
/// Reads run in parallel with staggered start times.
pub async fn read_snapshot(
    source: &dyn ReleaseSource,
    config: &IndexConfig,
) -> Result<RepositorySnapshot, RefreshError> {
    let reads = config
        .feature_versions
        .iter()
        .enumerate()
        .map(|(i, &feature_version)| {
            let delay = Duration::from_millis(config.refresh.stagger_delay_ms * i as u64);
            read_feature_group(source, feature_version, delay)
        });

    let groups = join_all(reads)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RepositorySnapshot::from_groups(groups.into_iter().flatten()))
}

/// Run one refresh cycle
///
/// On success the new snapshot is published. On failure the error is logged and returned, and
/// `store` keeps serving its previous snapshot.
pub async fn refresh_snapshot(
    store: &SnapshotStore,
    source: &dyn ReleaseSource,
    config: &IndexConfig,
) -> Result<(), RefreshError> {
    let snapshot = read_snapshot(source, config)
        .await
        .inspect_err(|e| error!("Refresh failed, keeping previous snapshot: {}", e))?;

    let release_count = snapshot.all_releases().len();
    let group_count = snapshot.feature_versions().count();
    store.swap(snapshot);
    info!(
        "Published snapshot with {} releases across {} feature versions",
        release_count, group_count
    );

    Ok(())
}

/// Refresh on every `refresh.intervalMs` tick until `shutdown` is cancelled
///
/// The first cycle runs immediately. Failed cycles are retried on the next tick.
pub async fn run_refresh_loop(
    store: &SnapshotStore,
    source: &dyn ReleaseSource,
    config: &IndexConfig,
    shutdown: CancellationToken,
) {
    let period = config.refresh.interval().max(MIN_REFRESH_INTERVAL);
    info!("Refresh loop starting with period {:?}", period);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("Refresh loop shutting down");
                break;
            }

            _ = ticker.tick() => {
                let _ = refresh_snapshot(store, source, config).await;
            }
        }
    }
}

/// Changes needed to bring an index in line with an incoming release list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// New releases and releases whose incoming copy is newer
    pub upserts: Vec<Release>,
    /// Ids present in the index but absent from the incoming list
    pub removals: Vec<String>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.removals.is_empty()
    }
}

/// Diff `incoming` against `index` without rebuilding either
pub fn plan_sync(index: &ReleaseIndex, incoming: &[Release]) -> SyncPlan {
    let needs_upsert = |id: &str, updated_at: DateTime<Utc>| {
        !index.has_release_id(id) || index.has_been_updated_since(id, updated_at)
    };

    let upserts = incoming
        .iter()
        .filter(|release| needs_upsert(&release.id, release.updated_at))
        .cloned()
        .collect();

    let incoming_ids: HashSet<&str> = incoming.iter().map(|release| release.id.as_str()).collect();
    let removals = index
        .ids()
        .filter(|id| !incoming_ids.contains(id))
        .map(str::to_string)
        .collect();

    SyncPlan { upserts, removals }
}
