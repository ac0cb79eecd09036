//! Upstream read boundary for refresh cycles

#[cfg(test)]
use mockall::automock;

use crate::release::snapshot::FeatureGroup;
use crate::store::error::SourceError;

/// Supplies the releases of one major version line
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Reads every release stored for `feature_version`
    ///
    /// # Returns
    /// * `Ok(FeatureGroup)` - Possibly empty group keyed by `feature_version`
    /// * `Err(SourceError)` - If the read fails; the refresh cycle keeps the previous snapshot
    async fn read_release_data(&self, feature_version: u32) -> Result<FeatureGroup, SourceError>;
}
