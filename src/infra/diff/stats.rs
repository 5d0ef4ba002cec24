use super::line_diff::change_runs;
use super::unified::is_metadata_line;
use crate::domain::{ChangeKind, ChangeRun, DiffStats};

/// Totals for a before/after pair, summed from the line-diff change runs.
pub fn stats_from_pair(before: &str, after: &str) -> DiffStats {
    stats_from_runs(&change_runs(before, after))
}

/// Line count as `u32`, clamped at `u32::MAX`.
pub fn clamp_count(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub fn stats_from_runs(runs: &[ChangeRun]) -> DiffStats {
    let mut stats = DiffStats::default();
    for run in runs {
        match run.kind {
            ChangeKind::Added => stats += DiffStats::new(clamp_count(run.count), 0),
            ChangeKind::Removed => stats += DiffStats::new(0, clamp_count(run.count)),
            ChangeKind::Equal => {}
        }
    }
    stats
}

/// Totals for unified diff text. File headers (`+++`, `---`) and other
/// metadata lines are excluded before a line is counted.
pub fn stats_from_unified(diff_text: &str) -> DiffStats {
    let mut stats = DiffStats::default();
    for line in diff_text.lines() {
        if is_metadata_line(line) {
            continue;
        }
        if line.starts_with('+') {
            stats.additions = stats.additions.saturating_add(1);
        } else if line.starts_with('-') {
            stats.deletions = stats.deletions.saturating_add(1);
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::diff::unified::extract_sides;

    const PATCH: &str = "diff --git a/a.txt b/a.txt\n--- a/a.txt\n+++ b/a.txt\n@@ -1,3 +1,4 @@\n keep\n-old\n+new\n+extra\n tail\n";

    #[test]
    fn test_stats_from_unified_excludes_headers() {
        assert_eq!(stats_from_unified(PATCH), DiffStats::new(2, 1));
        assert_eq!(
            stats_from_unified("@@ -1,2 +1,2 @@\n-foo\n+bar\n baz"),
            DiffStats::new(1, 1)
        );
    }

    #[test]
    fn test_stats_from_pair() {
        assert_eq!(stats_from_pair("a\nb\nc", "a\nb\nc"), DiffStats::default());
        assert_eq!(stats_from_pair("a\nb", "a\nc\nd"), DiffStats::new(2, 1));
        assert_eq!(stats_from_pair("", "x\ny"), DiffStats::new(2, 0));
    }

    #[test]
    fn test_stats_from_runs_clamps_huge_counts() {
        let run = |kind, count| ChangeRun {
            kind,
            count,
            old_start: 0,
            new_start: 0,
            lines: Vec::new(),
        };
        let runs = vec![
            run(ChangeKind::Added, usize::MAX),
            run(ChangeKind::Added, 3),
            run(ChangeKind::Removed, 2),
            run(ChangeKind::Equal, usize::MAX),
        ];
        assert_eq!(stats_from_runs(&runs), DiffStats::new(u32::MAX, 2));
        assert_eq!(clamp_count(7), 7);
    }

    #[test]
    fn test_pair_and_unified_paths_agree() {
        let (before, after) = extract_sides(PATCH);
        assert_eq!(stats_from_pair(&before, &after), stats_from_unified(PATCH));
    }
}
