use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Classification of a rendered diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffLineKind {
    Add,
    Delete,
    Context,
}

impl fmt::Display for DiffLineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Context => "context",
        };
        write!(f, "{s}")
    }
}

/// Line payload: literal text straight from the parsers, or markup that has
/// already been escaped by the highlight mapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", content = "value", rename_all = "snake_case")]
pub enum LineContent {
    Text(String),
    Markup(String),
}

impl LineContent {
    /// Raw string regardless of format.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Markup(s) => s,
        }
    }

    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Markup(_))
    }
}

/// A single classified line of a diff.
///
/// Line numbers are 1-based. `old_line_no` is present for every kind except
/// [`DiffLineKind::Add`], `new_line_no` for every kind except
/// [`DiffLineKind::Delete`]. The constructors enforce this, and deserializing
/// a line that breaks it fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDiffLine")]
pub struct DiffLine {
    kind: DiffLineKind,
    content: LineContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    old_line_no: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    new_line_no: Option<u32>,
}

impl DiffLine {
    pub fn added(content: impl Into<String>, new_line_no: u32) -> Self {
        Self {
            kind: DiffLineKind::Add,
            content: LineContent::Text(content.into()),
            old_line_no: None,
            new_line_no: Some(new_line_no),
        }
    }

    pub fn deleted(content: impl Into<String>, old_line_no: u32) -> Self {
        Self {
            kind: DiffLineKind::Delete,
            content: LineContent::Text(content.into()),
            old_line_no: Some(old_line_no),
            new_line_no: None,
        }
    }

    pub fn context(content: impl Into<String>, old_line_no: u32, new_line_no: u32) -> Self {
        Self {
            kind: DiffLineKind::Context,
            content: LineContent::Text(content.into()),
            old_line_no: Some(old_line_no),
            new_line_no: Some(new_line_no),
        }
    }

    pub fn kind(&self) -> DiffLineKind {
        self.kind
    }

    pub fn content(&self) -> &LineContent {
        &self.content
    }

    /// Shorthand for `content().as_str()`.
    pub fn text(&self) -> &str {
        self.content.as_str()
    }

    pub fn old_line_no(&self) -> Option<u32> {
        self.old_line_no
    }

    pub fn new_line_no(&self) -> Option<u32> {
        self.new_line_no
    }

    /// Same line with its content replaced; classification and numbers are kept.
    pub fn with_content(&self, content: LineContent) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }
}

#[derive(Deserialize)]
struct RawDiffLine {
    kind: DiffLineKind,
    content: LineContent,
    #[serde(default)]
    old_line_no: Option<u32>,
    #[serde(default)]
    new_line_no: Option<u32>,
}

impl TryFrom<RawDiffLine> for DiffLine {
    type Error = String;

    fn try_from(raw: RawDiffLine) -> Result<Self, Self::Error> {
        let numbers_match = match raw.kind {
            DiffLineKind::Add => raw.old_line_no.is_none() && raw.new_line_no.is_some(),
            DiffLineKind::Delete => raw.old_line_no.is_some() && raw.new_line_no.is_none(),
            DiffLineKind::Context => raw.old_line_no.is_some() && raw.new_line_no.is_some(),
        };
        if !numbers_match {
            return Err(format!(
                "{} line has inconsistent line numbers (old: {:?}, new: {:?})",
                raw.kind, raw.old_line_no, raw.new_line_no
            ));
        }
        Ok(Self {
            kind: raw.kind,
            content: raw.content,
            old_line_no: raw.old_line_no,
            new_line_no: raw.new_line_no,
        })
    }
}

/// Header of a unified-diff hunk: `@@ -old_start,old_len +new_start,new_len @@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_len: u32,
    pub new_start: u32,
    pub new_len: u32,
}

impl Default for DiffHunk {
    fn default() -> Self {
        Self {
            old_start: 1,
            old_len: 0,
            new_start: 1,
            new_len: 0,
        }
    }
}

impl fmt::Display for DiffHunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

/// One row of render output. Hunk rows are visual separators and carry no
/// line numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "row", rename_all = "snake_case")]
pub enum DiffRow {
    Hunk(DiffHunk),
    Line(DiffLine),
}

impl DiffRow {
    pub fn as_line(&self) -> Option<&DiffLine> {
        match self {
            Self::Line(line) => Some(line),
            Self::Hunk(_) => None,
        }
    }
}

impl From<DiffLine> for DiffRow {
    fn from(line: DiffLine) -> Self {
        Self::Line(line)
    }
}

/// Kind of a change run produced by the line-diff primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Equal,
    Added,
    Removed,
}

/// A maximal span of equal, added or removed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRun {
    pub kind: ChangeKind,
    pub count: usize,
    /// Zero-based index of the first line of this run in the old text.
    pub old_start: usize,
    /// Zero-based index of the first line of this run in the new text.
    pub new_start: usize,
    pub lines: Vec<String>,
}

/// Added/removed line totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: u32,
    pub deletions: u32,
}

impl DiffStats {
    pub fn new(additions: u32, deletions: u32) -> Self {
        Self {
            additions,
            deletions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }
}

impl Add for DiffStats {
    type Output = DiffStats;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            additions: self.additions.saturating_add(rhs.additions),
            deletions: self.deletions.saturating_add(rhs.deletions),
        }
    }
}

impl AddAssign for DiffStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
