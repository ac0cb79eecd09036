use thiserror::Error;

use crate::release::error::SnapshotError;
use crate::version::error::ParseError;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid release document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error("Feature version not found: {0}")]
    NotFound(u32),
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Failed to read feature version {feature_version}: {source}")]
    Source {
        feature_version: u32,
        #[source]
        source: SourceError,
    },

    #[error(transparent)]
    FeatureVersionMismatch(#[from] SnapshotError),
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid release JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Release at position {0} has no release_name")]
    MissingName(usize),

    #[error("Release {name}: {source}")]
    Version {
        name: String,
        #[source]
        source: ParseError,
    },
}
