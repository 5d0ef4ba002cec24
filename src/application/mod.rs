//! Application layer (use-cases, policies).
//!
//! Orchestrates the diff primitives into render output and change trees
//! without depending on any UI framework.

pub mod changes;
pub mod render;

pub use changes::{build_changes_tree, tree_totals};
pub use render::{
    DiffInput, DiffRenderer, DiffView, RenderOptions, RenderTicket, RenderedDiff, zip_highlight,
    zip_highlight_rows,
};
