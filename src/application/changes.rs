//! Rolls a flat list of changed files up into a directory tree.

use crate::domain::{ChangesTreeNode, DiffStats, FileDiff, FileStatus};
use std::cmp::Ordering;

/// Builds the changes tree for `files`, in any input order.
///
/// Directory counts are accumulated while files are inserted. Afterwards
/// every level is ordered directories first, then by name, and each
/// directory takes the highest-priority status of its children
/// (added > modified > deleted).
pub fn build_changes_tree(files: &[FileDiff]) -> Vec<ChangesTreeNode> {
    let mut roots: Vec<ChangesTreeNode> = Vec::new();

    for file in files {
        let segments: Vec<&str> = file
            .file
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .collect();
        let Some((leaf, dirs)) = segments.split_last() else {
            log::warn!("Skipping changed file with empty path: {:?}", file.file);
            continue;
        };

        let mut level = &mut roots;
        let mut path = String::new();
        for dir in dirs {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(dir);

            let idx = match level
                .iter()
                .position(|node| node.is_directory() && node.name == *dir)
            {
                Some(idx) => idx,
                None => {
                    level.push(ChangesTreeNode::directory(*dir, path.clone()));
                    level.len() - 1
                }
            };

            let node = &mut level[idx];
            node.additions = node.additions.saturating_add(file.additions);
            node.deletions = node.deletions.saturating_add(file.deletions);
            level = &mut node.children;
        }

        let leaf_path = if path.is_empty() {
            leaf.to_string()
        } else {
            format!("{path}/{leaf}")
        };
        level.push(ChangesTreeNode::file(*leaf, leaf_path, file));
    }

    finalize(&mut roots);
    roots
}

fn finalize(nodes: &mut [ChangesTreeNode]) {
    for node in nodes.iter_mut() {
        if node.is_directory() {
            finalize(&mut node.children);
            node.status = rollup_status(&node.children);
        }
    }
    nodes.sort_by(display_order);
}

fn display_order(a: &ChangesTreeNode, b: &ChangesTreeNode) -> Ordering {
    b.is_directory()
        .cmp(&a.is_directory())
        .then_with(|| a.name.cmp(&b.name))
}

/// Highest-priority status among `children`.
pub fn rollup_status(children: &[ChangesTreeNode]) -> Option<FileStatus> {
    children
        .iter()
        .filter_map(|child| child.status)
        .max_by_key(|status| status.rank())
}

/// Sum of the top-level counts of a tree.
pub fn tree_totals(roots: &[ChangesTreeNode]) -> DiffStats {
    roots
        .iter()
        .fold(DiffStats::default(), |acc, node| acc + node.stats())
}
