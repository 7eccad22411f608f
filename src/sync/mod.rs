//! Sync engine: list the camera, scan the destination, pick the worklist,
//! then fetch it one photo at a time.
//!
//! Every phase finishes before the next begins. The only state carried
//! between runs is the checkpoint in the [`CheckpointStore`], which moves
//! forward after each photo lands on disk.

pub mod error;
pub mod fetch;
pub mod file;
pub mod local;
pub mod paths;
pub mod reconcile;
pub mod remote;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use crate::camera::CameraClient;
use crate::state::CheckpointStore;
use reconcile::StartPoint;

/// Subset of application config consumed by the sync engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub(crate) dest_dir: PathBuf,
    pub(crate) start: StartPoint,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub remote_total: usize,
    pub worklist: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub interrupted: bool,
}

/// Create a progress bar with a consistent template.
///
/// Returns `ProgressBar::hidden()` when the user passed `--no-progress-bar` or
/// stdout is not a TTY (e.g. piped output, cron jobs).
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );
    pb
}

/// Run one sync pass against the camera.
///
/// Fatal conditions (listing failure, start photo not on the camera,
/// checkpoint persistence failure) return `Err`. Individual photo failures
/// are counted in the summary and do not fail the pass.
pub async fn run_sync(
    camera: &CameraClient,
    store: &dyn CheckpointStore,
    config: &SyncConfig,
    cancel: CancellationToken,
) -> Result<SyncSummary> {
    let started = Instant::now();
    let dest = &config.dest_dir;

    if !config.dry_run {
        tokio::fs::create_dir_all(dest)
            .await
            .with_context(|| format!("Creating destination {}", dest.display()))?;
    }

    let photos = remote::list_remote(camera, dest, !config.dry_run).await?;

    let scan_root = dest.clone();
    let local = tokio::task::spawn_blocking(move || local::scan_local(&scan_root)).await?;
    tracing::info!("{} files already in {}", local.len(), dest.display());

    let checkpoint = store.last_copied().await?;
    if let Some(c) = &checkpoint {
        tracing::debug!("Stored checkpoint: {}", c);
    }

    let work = reconcile::worklist(&photos, &config.start, checkpoint.as_deref())?;

    let mut summary = SyncSummary {
        remote_total: photos.len(),
        worklist: work.len(),
        ..SyncSummary::default()
    };

    if work.is_empty() {
        tracing::info!("No new photos to download");
        return Ok(summary);
    }

    if config.dry_run {
        for entry in work {
            if local.contains(&entry.id()) {
                summary.skipped += 1;
            } else {
                tracing::info!("[DRY RUN] Would download {}", entry);
            }
        }
        tracing::info!("── Dry Run Summary ──");
        tracing::info!(
            "  {} of {} photos would be downloaded, {} already present",
            work.len() - summary.skipped,
            work.len(),
            summary.skipped
        );
        tracing::info!("  destination: {}", dest.display());
        return Ok(summary);
    }

    tracing::info!("Syncing {} photos starting at {}", work.len(), work[0]);

    let pb = create_progress_bar(config.no_progress_bar, work.len() as u64);
    let stats = fetch::fetch_worklist(camera, work, &local, dest, store, &pb, &cancel).await;
    pb.finish_and_clear();
    let stats = stats?;

    summary.downloaded = stats.downloaded;
    summary.skipped = stats.skipped;
    summary.failed = stats.failed.len();
    summary.interrupted = stats.interrupted;

    tracing::info!("── Summary ──");
    tracing::info!(
        "  {} downloaded, {} already present, {} failed",
        summary.downloaded,
        summary.skipped,
        summary.failed
    );
    tracing::info!("  {} bytes in {}", stats.bytes, format_duration(started.elapsed()));
    if summary.interrupted {
        tracing::info!("  Interrupted; run again to continue");
    }
    for entry in &stats.failed {
        tracing::warn!("  Not copied: {}", entry);
    }

    Ok(summary)
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::RemoteEntry;
    use crate::state::JsonStateFile;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_listing(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/v1/photos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_photo(server: &MockServer, id: &str, hits: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/photos/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(id.as_bytes().to_vec()))
            .expect(hits)
            .mount(server)
            .await;
    }

    fn three_photo_listing() -> serde_json::Value {
        json!({
            "errCode": 200,
            "errMsg": "OK",
            "dirs": [
                {"name": "100RICOH", "files": ["R01.JPG", "R02.JPG"]},
                {"name": "101RICOH", "files": ["R03.JPG"]}
            ]
        })
    }

    fn sync_config(dest: &Path, start: StartPoint) -> SyncConfig {
        SyncConfig {
            dest_dir: dest.to_path_buf(),
            start,
            dry_run: false,
            no_progress_bar: true,
        }
    }

    async fn open_store(dir: &tempfile::TempDir) -> JsonStateFile {
        JsonStateFile::open(&dir.path().join("config.json"))
            .await
            .unwrap()
    }

    #[test]
    fn test_format_duration_seconds_only() {
        assert_eq!(format_duration(Duration::from_secs(0)), "0s");
        assert_eq!(format_duration(Duration::from_secs(59)), "59s");
    }

    #[test]
    fn test_format_duration_minutes_and_hours() {
        assert_eq!(format_duration(Duration::from_secs(61)), "1m 01s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 01m 01s");
    }

    #[test]
    fn test_create_progress_bar_hidden_when_disabled() {
        assert!(create_progress_bar(true, 10).is_hidden());
    }

    #[tokio::test]
    async fn test_full_sync_skips_local_and_checkpoints_last() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 0).await;
        mount_photo(&server, "100RICOH/R02.JPG", 1).await;
        mount_photo(&server, "101RICOH/R03.JPG", 1).await;

        let dest = tempfile::tempdir().unwrap();
        fs::create_dir_all(dest.path().join("100RICOH")).unwrap();
        fs::write(dest.path().join("100RICOH/R01.JPG"), b"old").unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(
            &camera,
            &store,
            &sync_config(dest.path(), StartPoint::All),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.remote_total, 3);
        assert_eq!(summary.worklist, 3);
        assert_eq!(summary.downloaded, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(fs::read(dest.path().join("100RICOH/R01.JPG")).unwrap(), b"old");
        assert_eq!(
            fs::read(dest.path().join("100RICOH/R02.JPG")).unwrap(),
            b"100RICOH/R02.JPG"
        );
        assert_eq!(
            fs::read(dest.path().join("101RICOH/R03.JPG")).unwrap(),
            b"101RICOH/R03.JPG"
        );
        assert_eq!(
            store.last_copied().await.unwrap().as_deref(),
            Some("101RICOH/R03.JPG")
        );
    }

    #[tokio::test]
    async fn test_resume_starts_after_checkpoint() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 0).await;
        mount_photo(&server, "100RICOH/R02.JPG", 0).await;
        mount_photo(&server, "101RICOH/R03.JPG", 1).await;

        let dest = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;
        store.record_copied("100RICOH/R02.JPG").await.unwrap();

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(
            &camera,
            &store,
            &sync_config(dest.path(), StartPoint::Resume),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.worklist, 1);
        assert_eq!(summary.downloaded, 1);
        assert_eq!(
            store.last_copied().await.unwrap().as_deref(),
            Some("101RICOH/R03.JPG")
        );
    }

    #[tokio::test]
    async fn test_stale_checkpoint_rescans_everything() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 1).await;
        mount_photo(&server, "100RICOH/R02.JPG", 1).await;
        mount_photo(&server, "101RICOH/R03.JPG", 1).await;

        let dest = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;
        store.record_copied("099RICOH/R00.JPG").await.unwrap();

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(
            &camera,
            &store,
            &sync_config(dest.path(), StartPoint::Resume),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.worklist, 3);
        assert_eq!(summary.downloaded, 3);
    }

    #[tokio::test]
    async fn test_missing_marker_fails_before_download() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 0).await;
        mount_photo(&server, "100RICOH/R02.JPG", 0).await;
        mount_photo(&server, "101RICOH/R03.JPG", 0).await;

        let dest = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;

        let camera = CameraClient::new(&server.uri()).unwrap();
        let err = run_sync(
            &camera,
            &store,
            &sync_config(
                dest.path(),
                StartPoint::Marker(RemoteEntry::new("100RICOH", "R0000005.JPG")),
            ),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("100RICOH/R0000005.JPG"));
        assert_eq!(store.last_copied().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_marker_starts_inclusive() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 0).await;
        mount_photo(&server, "100RICOH/R02.JPG", 1).await;
        mount_photo(&server, "101RICOH/R03.JPG", 1).await;

        let dest = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(
            &camera,
            &store,
            &sync_config(
                dest.path(),
                StartPoint::Marker(RemoteEntry::new("100RICOH", "R02.JPG")),
            ),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.downloaded, 2);
    }

    #[tokio::test]
    async fn test_up_to_date_is_noop() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "101RICOH/R03.JPG", 0).await;

        let dest = tempfile::tempdir().unwrap();
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;
        store.record_copied("101RICOH/R03.JPG").await.unwrap();

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(
            &camera,
            &store,
            &sync_config(dest.path(), StartPoint::Resume),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.worklist, 0);
        assert_eq!(summary.downloaded, 0);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let server = MockServer::start().await;
        mount_listing(&server, three_photo_listing()).await;
        mount_photo(&server, "100RICOH/R01.JPG", 0).await;
        mount_photo(&server, "100RICOH/R02.JPG", 0).await;
        mount_photo(&server, "101RICOH/R03.JPG", 0).await;

        let dest = tempfile::tempdir().unwrap();
        let target = dest.path().join("photos");
        let state_dir = tempfile::tempdir().unwrap();
        let store = open_store(&state_dir).await;

        let mut config = sync_config(&target, StartPoint::All);
        config.dry_run = true;

        let camera = CameraClient::new(&server.uri()).unwrap();
        let summary = run_sync(&camera, &store, &config, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.worklist, 3);
        assert_eq!(summary.downloaded, 0);
        assert!(!target.exists());
        assert_eq!(store.last_copied().await.unwrap(), None);
    }
}
