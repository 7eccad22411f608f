use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use super::paths::{self, PART_SUFFIX};

/// Relative `dir/file` paths of everything already under the destination.
pub type LocalFileSet = HashSet<String>;

/// Recursively list regular files under `root` as `/`-joined relative paths.
///
/// Membership is all that matters: a path that exists is taken to hold the
/// same photo as the camera's file of that name. Leftover `.part` files from
/// an interrupted transfer are not counted. Blocking; run it on a blocking
/// thread from async code.
pub fn scan_local(root: &Path) -> LocalFileSet {
    let mut files = LocalFileSet::new();
    if !root.is_dir() {
        tracing::debug!("{} does not exist yet, nothing local", root.display());
        return files;
    }

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(PART_SUFFIX) {
            continue;
        }
        if let Some(id) = paths::relative_id(root, entry.path()) {
            files.insert(id);
        }
    }

    tracing::debug!(count = files.len(), "Scanned local files");
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_local(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_scan_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("100RICOH")).unwrap();
        fs::create_dir_all(root.join("archive/2024/raw")).unwrap();
        fs::write(root.join("100RICOH/R0000001.JPG"), b"a").unwrap();
        fs::write(root.join("archive/2024/raw/R0000002.DNG"), b"b").unwrap();
        fs::write(root.join("top.txt"), b"c").unwrap();

        let files = scan_local(root);
        let mut sorted: Vec<_> = files.into_iter().collect();
        sorted.sort();
        assert_eq!(
            sorted,
            vec![
                "100RICOH/R0000001.JPG",
                "archive/2024/raw/R0000002.DNG",
                "top.txt"
            ]
        );
    }

    #[test]
    fn test_empty_dirs_and_part_files_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("101RICOH")).unwrap();
        fs::create_dir_all(root.join("100RICOH")).unwrap();
        fs::write(root.join("100RICOH/R0000003.JPG.part"), b"half").unwrap();

        assert!(scan_local(root).is_empty());
    }
}
