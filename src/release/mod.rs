//! Release layer: release records, the dual-ordered index, snapshots and query filters
//!
//! # Modules
//!
//! - [`types`]: `Release`, `Binary` and the closed vocabularies they use
//! - [`index`]: `ReleaseIndex`, copy-on-write and ordered by version or time
//! - [`snapshot`]: `FeatureGroup` and the immutable `RepositorySnapshot`
//! - [`filter`]: `ReleaseFilter` and `BinaryFilter` predicates
//! - [`error`]: Snapshot invariant violations

pub mod error;
pub mod filter;
pub mod index;
pub mod snapshot;
pub mod types;

pub use error::SnapshotError;
pub use filter::{BinaryFilter, ReleaseFilter};
pub use index::{ReleaseIndex, SortMethod, SortOrder};
pub use snapshot::{AvailableReleases, FeatureGroup, LatestBinary, RepositorySnapshot};
pub use types::{Binary, Release};
