use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::camera::RemoteEntry;

/// Suffix of in-flight downloads; renamed away once the body is complete.
pub const PART_SUFFIX: &str = ".part";

/// Whether a name from the camera listing is usable as exactly one path
/// component under the destination root.
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.contains(':')
}

/// `<root>/<dir>/<file>` for a camera photo.
pub fn local_photo_path(root: &Path, entry: &RemoteEntry) -> PathBuf {
    root.join(&entry.dir).join(&entry.file)
}

/// Sibling temp path: `R0000001.JPG` -> `R0000001.JPG.part`.
pub fn part_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(PART_SUFFIX);
    path.with_file_name(name)
}

/// `/`-joined path of `path` relative to `root`, the same shape as a
/// [`RemoteEntry`] id. `None` when `path` is not under `root`.
pub fn relative_id(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
