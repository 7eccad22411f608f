use std::path::Path;

use anyhow::Context;

use super::paths;
use crate::camera::{CameraClient, PhotoDir, RemoteEntry};

/// Flatten the camera's directory tree into one ordered photo list.
///
/// Directory order, then file order within each directory, exactly as the
/// camera sent them. Names that would escape the destination root are
/// dropped with a warning.
pub fn flatten_listing(dirs: &[PhotoDir]) -> Vec<RemoteEntry> {
    let mut photos = Vec::new();
    for dir in dirs {
        if !paths::is_safe_component(&dir.name) {
            tracing::warn!("Ignoring camera directory with unusable name {:?}", dir.name);
            continue;
        }
        for file in &dir.files {
            if !paths::is_safe_component(file) {
                tracing::warn!(
                    "Ignoring camera file with unusable name {:?} in {}",
                    file,
                    dir.name
                );
                continue;
            }
            photos.push(RemoteEntry::new(dir.name.as_str(), file.as_str()));
        }
    }
    photos
}

/// Fetch the photo list and, unless `create_dirs` is false, make sure each
/// camera directory exists under `dest`.
pub async fn list_remote(
    camera: &CameraClient,
    dest: &Path,
    create_dirs: bool,
) -> anyhow::Result<Vec<RemoteEntry>> {
    let dirs = camera
        .list_photos()
        .await
        .context("Failed to list photos on the camera")?;

    if create_dirs {
        for dir in dirs.iter().filter(|d| paths::is_safe_component(&d.name)) {
            let local_dir = dest.join(&dir.name);
            tokio::fs::create_dir_all(&local_dir)
                .await
                .with_context(|| format!("Creating {}", local_dir.display()))?;
        }
    }

    let photos = flatten_listing(&dirs);
    tracing::info!(
        "Found {} photos in {} directories on the camera",
        photos.len(),
        dirs.len()
    );
    Ok(photos)
}
