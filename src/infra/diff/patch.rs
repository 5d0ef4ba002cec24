//! Multi-file git patches split into per-file records.

use super::stats::clamp_count;
use crate::domain::{DiffError, FileDiff};
use unidiff::{PatchSet, PatchedFile};

const DEV_NULL: &str = "/dev/null";

fn is_dev_null(path: &str) -> bool {
    path == DEV_NULL || path == "dev/null"
}

/// Strips the `a/` / `b/` prefixes git puts on patch paths.
pub fn normalize_patch_path(path: &str) -> String {
    let path = path.trim();
    let path = path.split('\t').next().unwrap_or(path);
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path)
        .trim_start_matches("./")
        .to_string()
}

fn file_path(file: &PatchedFile) -> String {
    if is_dev_null(&file.target_file) {
        normalize_patch_path(&file.source_file)
    } else {
        normalize_patch_path(&file.target_file)
    }
}

fn parse_patch(diff_text: &str) -> Result<Option<PatchSet>, DiffError> {
    let trimmed = diff_text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut patch = PatchSet::new();
    patch
        .parse(trimmed)
        .map_err(|e| DiffError::InvalidPatch(e.to_string()))?;
    Ok(Some(patch))
}

/// Builds one [`FileDiff`] per file of a git patch.
///
/// `before`/`after` hold the visible text of each side (context plus removed,
/// context plus added lines); a side whose path is `/dev/null` is `None`, so
/// the file status comes out as added or deleted.
pub fn files_from_patch(diff_text: &str) -> Result<Vec<FileDiff>, DiffError> {
    let Some(patch) = parse_patch(diff_text)? else {
        return Ok(Vec::new());
    };

    let mut files = Vec::new();
    for file in patch.files() {
        let mut before = Vec::new();
        let mut after = Vec::new();
        for hunk in file.hunks() {
            for line in hunk.lines() {
                if line.is_removed() {
                    before.push(line.value.as_str());
                } else if line.is_added() {
                    after.push(line.value.as_str());
                } else if line.is_context() {
                    before.push(line.value.as_str());
                    after.push(line.value.as_str());
                }
            }
        }

        let before = (!is_dev_null(&file.source_file)).then(|| before.join("\n"));
        let after = (!is_dev_null(&file.target_file)).then(|| after.join("\n"));

        files.push(FileDiff {
            file: file_path(file),
            before,
            after,
            additions: clamp_count(file.added()),
            deletions: clamp_count(file.removed()),
        });
    }

    log::debug!("split patch into {} file(s)", files.len());
    Ok(files)
}

/// Splits a git patch into `(path, unified text)` pairs, one per file, so each
/// file can be rendered on its own.
pub fn split_patch(diff_text: &str) -> Result<Vec<(String, String)>, DiffError> {
    let Some(patch) = parse_patch(diff_text)? else {
        return Ok(Vec::new());
    };

    Ok(patch
        .files()
        .iter()
        .map(|file| {
            let mut text = format!("--- {}\n+++ {}\n", file.source_file, file.target_file);
            for hunk in file.hunks() {
                text.push_str(&format!(
                    "@@ -{},{} +{},{} @@\n",
                    hunk.source_start, hunk.source_length, hunk.target_start, hunk.target_length
                ));
                for line in hunk.lines() {
                    let prefix = if line.is_added() {
                        '+'
                    } else if line.is_removed() {
                        '-'
                    } else {
                        ' '
                    };
                    text.push(prefix);
                    text.push_str(&line.value);
                    text.push('\n');
                }
            }
            (file_path(file), text)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FileStatus;

    const TEST_PATCH: &str = r#"diff --git a/src/main.rs b/src/main.rs
index 0123456..789abcd 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,3 @@
 fn main() {
-    println!("Hello, world!");
+    println!("Hello, diff!");
 }
diff --git a/src/lib.rs b/src/lib.rs
new file mode 100644
index 0000000..abcdefg
--- /dev/null
+++ b/src/lib.rs
@@ -0,0 +1,3 @@
+pub fn add(a: i32, b: i32) -> i32 {
+    a + b
+}
diff --git a/old.txt b/old.txt
deleted file mode 100644
index abcdefg..0000000
--- a/old.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-gone
-too
"#;

    #[test]
    fn test_files_from_patch() {
        let files = files_from_patch(TEST_PATCH).unwrap();
        assert_eq!(files.len(), 3);

        assert_eq!(files[0].file, "src/main.rs");
        assert_eq!(files[0].status(), FileStatus::Modified);
        assert_eq!((files[0].additions, files[0].deletions), (1, 1));
        assert_eq!(
            files[0].after.as_deref(),
            Some("fn main() {\n    println!(\"Hello, diff!\");\n}")
        );

        assert_eq!(files[1].file, "src/lib.rs");
        assert_eq!(files[1].status(), FileStatus::Added);
        assert_eq!(files[1].additions, 3);

        assert_eq!(files[2].file, "old.txt");
        assert_eq!(files[2].status(), FileStatus::Deleted);
        assert_eq!(files[2].deletions, 2);
    }

    #[test]
    fn test_empty_patch() {
        assert!(files_from_patch("  \n").unwrap().is_empty());
        assert!(split_patch("").unwrap().is_empty());
    }

    #[test]
    fn test_split_patch_keeps_hunks() {
        let parts = split_patch(TEST_PATCH).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].0, "src/lib.rs");
        assert!(parts[1].1.contains("@@ -0,0 +1,3 @@"));
        assert!(parts[1].1.contains("+    a + b"));
    }

    #[test]
    fn test_normalize_patch_path() {
        assert_eq!(normalize_patch_path("a/src/x.rs"), "src/x.rs");
        assert_eq!(normalize_patch_path("b/src/x.rs"), "src/x.rs");
        assert_eq!(normalize_patch_path("src/x.rs\t2024-01-01"), "src/x.rs");
    }
}
