use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error(
        "Release {release_id} has major version {major} but belongs to feature version {feature_version}"
    )]
    FeatureVersionMismatch {
        feature_version: u32,
        release_id: String,
        major: u32,
    },
}
