use std::path::Path;

use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;

use super::file;
use super::local::LocalFileSet;
use super::paths;
use crate::camera::{CameraClient, RemoteEntry};
use crate::state::{CheckpointStore, StateError};

/// Outcome counters for one pass over the worklist.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchStats {
    pub downloaded: usize,
    /// Already present locally before this run.
    pub skipped: usize,
    pub failed: Vec<RemoteEntry>,
    pub bytes: u64,
    /// Stopped early by a shutdown signal.
    pub interrupted: bool,
}

/// Work through `worklist` in order, one photo at a time.
///
/// A photo already in `local` is skipped and leaves the checkpoint alone.
/// A fetched photo is fully written to disk before the checkpoint moves to
/// it. Fetch failures are logged and the loop continues; only a failure to
/// persist the checkpoint aborts the pass.
pub async fn fetch_worklist(
    camera: &CameraClient,
    worklist: &[RemoteEntry],
    local: &LocalFileSet,
    dest: &Path,
    store: &dyn CheckpointStore,
    pb: &ProgressBar,
    cancel: &CancellationToken,
) -> Result<FetchStats, StateError> {
    let mut stats = FetchStats::default();

    for entry in worklist {
        if cancel.is_cancelled() {
            pb.suspend(|| tracing::info!("Shutdown requested, stopping before {}", entry));
            stats.interrupted = true;
            break;
        }

        let id = entry.id();
        pb.set_message(id.clone());

        if local.contains(&id) {
            tracing::debug!("{} already present, skipping", id);
            stats.skipped += 1;
            pb.inc(1);
            continue;
        }

        let download_path = paths::local_photo_path(dest, entry);
        match file::download_photo(camera, entry, &download_path).await {
            Ok(bytes) => {
                store.record_copied(&id).await?;
                tracing::debug!(size_bytes = bytes, "Downloaded {}", id);
                stats.downloaded += 1;
                stats.bytes += bytes;
            }
            Err(e) => {
                pb.suspend(|| tracing::error!("Download failed: {}: {}", id, e));
                stats.failed.push(entry.clone());
            }
        }
        pb.inc(1);
    }

    Ok(stats)
}
