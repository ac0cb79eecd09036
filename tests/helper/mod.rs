#![allow(dead_code)]

pub mod release;
pub mod source;

pub use release::{ReleaseBuilder, at};
pub use source::{InMemorySource, create_test_database};
