//! Store layer: where snapshots come from and how they are published
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐  read_release_data  ┌─────────────┐  swap  ┌───────────────┐
//! │ ReleaseSource  │────────────────────▶│   refresh   │───────▶│ SnapshotStore │
//! │ (database/mock)│   per feature ver.  │ (fail-soft) │        │  (ArcSwap)    │
//! └────────────────┘                     └─────────────┘        └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: `ReleaseSource` trait
//! - [`database`]: SQLite-backed `ReleaseDatabase`
//! - [`import`]: Release JSON loading and incremental writes
//! - [`refresh`]: Refresh cycle, scheduling loop and sync planning
//! - [`snapshot_store`]: Atomically swapped current snapshot
//! - [`error`]: Source, refresh and import errors

pub mod database;
pub mod error;
pub mod import;
pub mod refresh;
pub mod snapshot_store;
pub mod source;

pub use database::ReleaseDatabase;
pub use error::{ImportError, RefreshError, SourceError};
pub use refresh::{SyncPlan, plan_sync, refresh_snapshot, run_refresh_loop};
pub use snapshot_store::SnapshotStore;
pub use source::ReleaseSource;
