//! Line classification for git-style unified diff text.
//!
//! Parsing never fails. Unknown lines are skipped and a hunk header that
//! cannot be read leaves the running line counters where they were.

use crate::domain::{DiffHunk, DiffLine, DiffRow};
use once_cell::sync::Lazy;
use regex::Regex;

static HUNK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

/// Prefixes of lines that describe the diff rather than the content.
const METADATA_PREFIXES: [&str; 5] = ["---", "+++", "Index:", "===", "\\"];

/// Returns true for file headers and markers such as `\ No newline at end of file`.
pub fn is_metadata_line(line: &str) -> bool {
    METADATA_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Parses `@@ -o[,ol] +n[,nl] @@`. Omitted lengths default to 1.
pub fn parse_hunk_header(line: &str) -> Option<DiffHunk> {
    let caps = HUNK_HEADER.captures(line)?;
    let number = |idx: usize, default: u32| -> Option<u32> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(default),
        }
    };
    Some(DiffHunk {
        old_start: number(1, 1)?,
        old_len: number(2, 1)?,
        new_start: number(3, 1)?,
        new_len: number(4, 1)?,
    })
}

/// A content line after metadata filtering.
enum ContentLine<'a> {
    HunkHeader(Option<DiffHunk>),
    Removed(&'a str),
    Added(&'a str),
    Context(&'a str),
}

/// Classifies every content-bearing line of `diff_text`, in order.
fn content_lines(diff_text: &str) -> impl Iterator<Item = ContentLine<'_>> {
    let mut in_hunk = false;
    diff_text.lines().filter_map(move |raw| {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if is_metadata_line(line) {
            return None;
        }
        if line.starts_with("@@") {
            in_hunk = true;
            return Some(ContentLine::HunkHeader(parse_hunk_header(line)));
        }
        if let Some(rest) = line.strip_prefix('-') {
            Some(ContentLine::Removed(rest))
        } else if let Some(rest) = line.strip_prefix('+') {
            Some(ContentLine::Added(rest))
        } else if let Some(rest) = line.strip_prefix(' ') {
            Some(ContentLine::Context(rest))
        } else if line.is_empty() && in_hunk {
            // Some editors strip the leading space of blank context lines.
            Some(ContentLine::Context(""))
        } else {
            if line.starts_with("diff ") {
                in_hunk = false;
            }
            None
        }
    })
}

/// Parses unified diff text into render rows: one [`DiffRow::Hunk`] separator
/// per readable hunk header, followed by that hunk's classified lines.
pub fn parse_unified_diff(diff_text: &str) -> Vec<DiffRow> {
    let mut rows = Vec::new();
    let mut old_line_no = 1u32;
    let mut new_line_no = 1u32;

    for line in content_lines(diff_text) {
        match line {
            ContentLine::HunkHeader(Some(hunk)) => {
                old_line_no = hunk.old_start;
                new_line_no = hunk.new_start;
                rows.push(DiffRow::Hunk(hunk));
            }
            ContentLine::HunkHeader(None) => {
                log::debug!("unreadable hunk header; keeping line counters");
            }
            ContentLine::Removed(text) => {
                rows.push(DiffLine::deleted(text, old_line_no).into());
                old_line_no = old_line_no.saturating_add(1);
            }
            ContentLine::Added(text) => {
                rows.push(DiffLine::added(text, new_line_no).into());
                new_line_no = new_line_no.saturating_add(1);
            }
            ContentLine::Context(text) => {
                rows.push(DiffLine::context(text, old_line_no, new_line_no).into());
                old_line_no = old_line_no.saturating_add(1);
                new_line_no = new_line_no.saturating_add(1);
            }
        }
    }

    rows
}

/// Like [`parse_unified_diff`] without the hunk separator rows.
pub fn parse_unified_lines(diff_text: &str) -> Vec<DiffLine> {
    parse_unified_diff(diff_text)
        .into_iter()
        .filter_map(|row| match row {
            DiffRow::Line(line) => Some(line),
            DiffRow::Hunk(_) => None,
        })
        .collect()
}

/// Reconstructs the visible "before" and "after" texts of a unified diff:
/// context plus removed lines, and context plus added lines.
///
/// Every line is newline-terminated, so a blank last line survives a
/// `str::lines` split.
pub fn extract_sides(diff_text: &str) -> (String, String) {
    let mut before = String::new();
    let mut after = String::new();
    let push = |side: &mut String, text: &str| {
        side.push_str(text);
        side.push('\n');
    };

    for line in content_lines(diff_text) {
        match line {
            ContentLine::Removed(text) => push(&mut before, text),
            ContentLine::Added(text) => push(&mut after, text),
            ContentLine::Context(text) => {
                push(&mut before, text);
                push(&mut after, text);
            }
            ContentLine::HunkHeader(_) => {}
        }
    }

    (before, after)
}
