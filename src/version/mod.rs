//! Version layer: canonical versions, release-name parsing and range matching
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Parser    │────▶│    Model    │◀────│    Range    │
//! │ (free-form) │     │ (canonical) │     │  (matcher)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                                       │
//!        └───────────── boundary versions ───────┘
//! ```
//!
//! # Modules
//!
//! - [`model`]: `VersionModel` value type and its total ordering
//! - [`parser`]: Free-form release name to `VersionModel`
//! - [`range`]: Maven-style range specifications and their memoization
//! - [`error`]: Parse and range specification errors

pub mod error;
pub mod model;
pub mod parser;
pub mod range;

pub use error::{ParseError, RangeError};
pub use model::VersionModel;
pub use parser::VersionParser;
pub use range::{RangeCache, RangeSet, Restriction};
