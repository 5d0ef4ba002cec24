use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DiffStats;

/// A changed file as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Repository-relative path; unique within a collection.
    pub file: String,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
}

impl FileDiff {
    /// `Added` when there is no prior content, `Deleted` when there is no
    /// resulting content, `Modified` otherwise.
    pub fn status(&self) -> FileStatus {
        let is_blank = |side: &Option<String>| side.as_deref().is_none_or(str::is_empty);
        if is_blank(&self.before) {
            FileStatus::Added
        } else if is_blank(&self.after) {
            FileStatus::Deleted
        } else {
            FileStatus::Modified
        }
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::new(self.additions, self.deletions)
    }

    pub fn balance(&self) -> ChangeBalance {
        ChangeBalance::of(self.additions, self.deletions)
    }
}

/// Change status of a file, or the rolled-up status of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
}

impl FileStatus {
    /// Rollup priority: a directory takes the status of its highest-ranked child.
    pub fn rank(self) -> u8 {
        match self {
            Self::Added => 3,
            Self::Modified => 2,
            Self::Deleted => 1,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "added" | "new" | "a" => Ok(Self::Added),
            "modified" | "changed" | "m" => Ok(Self::Modified),
            "deleted" | "removed" | "d" => Ok(Self::Deleted),
            other => Err(format!("invalid file status: {other}")),
        }
    }
}

/// Which side dominates a file's or directory's change counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeBalance {
    None,
    Additions,
    Deletions,
    Mixed,
}

impl ChangeBalance {
    pub fn of(additions: u32, deletions: u32) -> Self {
        if additions == 0 && deletions == 0 {
            return Self::None;
        }
        match additions.cmp(&deletions) {
            std::cmp::Ordering::Greater => Self::Additions,
            std::cmp::Ordering::Less => Self::Deletions,
            std::cmp::Ordering::Equal => Self::Mixed,
        }
    }

    /// Short indicator shown next to a file name.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Additions => "+",
            Self::Deletions => "-",
            Self::Mixed => "±",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Directory,
}

/// A node of the rolled-up changes tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangesTreeNode {
    pub name: String,
    /// `/`-joined path from the tree root to this node.
    pub path: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChangesTreeNode>,
    pub additions: u32,
    pub deletions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
}

impl ChangesTreeNode {
    pub fn file(name: impl Into<String>, path: impl Into<String>, diff: &FileDiff) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            additions: diff.additions,
            deletions: diff.deletions,
            status: Some(diff.status()),
        }
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory,
            children: Vec::new(),
            additions: 0,
            deletions: 0,
            status: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::new(self.additions, self.deletions)
    }

    pub fn balance(&self) -> ChangeBalance {
        ChangeBalance::of(self.additions, self.deletions)
    }

    /// Depth-first pre-order traversal; the callback receives each node with
    /// its depth relative to `self` (0).
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a ChangesTreeNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a ChangesTreeNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }
}
