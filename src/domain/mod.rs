//! Domain types for diffview.
//! Defines the diff lines, hunks, change runs and change-tree nodes produced by the pipeline.

pub mod changes;
pub mod diff;
pub mod error;

pub use changes::*;
pub use diff::*;
pub use error::*;
