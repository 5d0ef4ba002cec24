//! Line-level diffs of two full texts, built on `similar`.

use crate::domain::{ChangeKind, ChangeRun, DiffLine};
use similar::{Algorithm, DiffOp, TextDiff};

/// Computes the change runs between two texts. The whole line is the unit of
/// comparison; a trailing newline does not produce an extra empty line.
pub fn change_runs(before: &str, after: &str) -> Vec<ChangeRun> {
    let old_lines: Vec<&str> = before.lines().collect();
    let new_lines: Vec<&str> = after.lines().collect();

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old_lines, &new_lines);

    let run = |kind, old_start, new_start, lines: &[&str]| ChangeRun {
        kind,
        count: lines.len(),
        old_start,
        new_start,
        lines: lines.iter().map(|l| l.to_string()).collect(),
    };

    let mut runs = Vec::new();
    for op in diff.ops() {
        match *op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } => runs.push(run(
                ChangeKind::Equal,
                old_index,
                new_index,
                &old_lines[old_index..old_index + len],
            )),
            DiffOp::Delete {
                old_index,
                old_len,
                new_index,
            } => runs.push(run(
                ChangeKind::Removed,
                old_index,
                new_index,
                &old_lines[old_index..old_index + old_len],
            )),
            DiffOp::Insert {
                old_index,
                new_index,
                new_len,
            } => runs.push(run(
                ChangeKind::Added,
                old_index,
                new_index,
                &new_lines[new_index..new_index + new_len],
            )),
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                runs.push(run(
                    ChangeKind::Removed,
                    old_index,
                    new_index,
                    &old_lines[old_index..old_index + old_len],
                ));
                runs.push(run(
                    ChangeKind::Added,
                    old_index + old_len,
                    new_index,
                    &new_lines[new_index..new_index + new_len],
                ));
            }
        }
    }

    runs
}

/// Translates change runs into numbered diff lines.
///
/// Two zero-based cursors walk the old and new texts independently; removed
/// runs advance the old cursor, added runs the new one, equal runs both.
/// Every input line therefore appears exactly once.
pub fn lines_from_runs(runs: &[ChangeRun]) -> Vec<DiffLine> {
    let mut out = Vec::with_capacity(runs.iter().map(|r| r.count).sum());
    let mut old_idx = 0u32;
    let mut new_idx = 0u32;

    for run in runs {
        for text in &run.lines {
            match run.kind {
                ChangeKind::Removed => {
                    out.push(DiffLine::deleted(text.as_str(), old_idx + 1));
                    old_idx += 1;
                }
                ChangeKind::Added => {
                    out.push(DiffLine::added(text.as_str(), new_idx + 1));
                    new_idx += 1;
                }
                ChangeKind::Equal => {
                    out.push(DiffLine::context(text.as_str(), old_idx + 1, new_idx + 1));
                    old_idx += 1;
                    new_idx += 1;
                }
            }
        }
    }

    out
}

/// Classified, numbered lines for a before/after pair.
pub fn compute_diff_lines(before: &str, after: &str) -> Vec<DiffLine> {
    lines_from_runs(&change_runs(before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DiffLineKind;

    #[test]
    fn test_identical_texts_are_all_context() {
        let lines = compute_diff_lines("a\nb\nc", "a\nb\nc");
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.kind() == DiffLineKind::Context));
        assert_eq!(lines[2].old_line_no(), Some(3));
        assert_eq!(lines[2].new_line_no(), Some(3));
    }

    #[test]
    fn test_trailing_newline_is_not_a_change() {
        let lines = compute_diff_lines("a\nb", "a\nb\n");
        assert!(lines.iter().all(|l| l.kind() == DiffLineKind::Context));
    }

    #[test]
    fn test_replacement_yields_removed_then_added() {
        let runs = change_runs("a\nb\nc", "a\nx\nc");
        let kinds: Vec<_> = runs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Equal,
                ChangeKind::Removed,
                ChangeKind::Added,
                ChangeKind::Equal
            ]
        );
        assert_eq!(runs[1].lines, vec!["b".to_string()]);
        assert_eq!(runs[2].lines, vec!["x".to_string()]);
        assert_eq!(runs[3].old_start, 2);
        assert_eq!(runs[3].new_start, 2);
    }

    #[test]
    fn test_line_numbers_are_continuous() {
        let before = "one\ntwo\nthree\nfour";
        let after = "zero\none\nthree\nfour\nfive";
        let lines = compute_diff_lines(before, after);

        let old_nums: Vec<u32> = lines.iter().filter_map(|l| l.old_line_no()).collect();
        let new_nums: Vec<u32> = lines.iter().filter_map(|l| l.new_line_no()).collect();
        assert_eq!(old_nums, vec![1, 2, 3, 4]);
        assert_eq!(new_nums, vec![1, 2, 3, 4, 5]);

        let removed: Vec<_> = lines
            .iter()
            .filter(|l| l.kind() == DiffLineKind::Delete)
            .map(|l| l.text())
            .collect();
        assert_eq!(removed, vec!["two"]);
    }

    #[test]
    fn test_empty_sides() {
        let added = compute_diff_lines("", "x\ny");
        assert_eq!(added, vec![DiffLine::added("x", 1), DiffLine::added("y", 2)]);
        let removed = compute_diff_lines("x", "");
        assert_eq!(removed, vec![DiffLine::deleted("x", 1)]);
        assert!(compute_diff_lines("", "").is_empty());
    }
}
