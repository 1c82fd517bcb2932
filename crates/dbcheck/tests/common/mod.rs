//! Test infrastructure for the database check suites.
//!
//! Not every suite uses every helper.
#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use harness::*;
