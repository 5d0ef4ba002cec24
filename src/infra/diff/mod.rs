//! Diff construction: unified-diff parsing, line diffs of full texts,
//! change statistics and multi-file patch splitting.

pub mod line_diff;
pub mod patch;
pub mod stats;
pub mod unified;

pub use line_diff::{change_runs, compute_diff_lines, lines_from_runs};
pub use patch::{files_from_patch, split_patch};
pub use stats::{stats_from_pair, stats_from_unified};
pub use unified::{extract_sides, parse_unified_diff, parse_unified_lines};
