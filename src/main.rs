//! grsync — copy new photos off a WiFi-connected camera.
//!
//! Waits for the camera's access point to answer, checks the battery, lists
//! the photos, works out which ones are new since the last run, and downloads
//! them one by one. The last photo copied is checkpointed after every file so
//! an interrupted sync resumes where it stopped.

#![warn(clippy::all)]

mod camera;
mod cli;
mod config;
pub mod retry;
mod shutdown;
mod state;
mod sync;
mod types;

use std::io::{IsTerminal, Write};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use camera::CameraClient;
use retry::PollPolicy;
use state::{CheckpointStore, JsonStateFile};
use tokio_util::sync::CancellationToken;

/// Ask for the destination directory on first run.
fn prompt_dest_dir() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    tokio::task::block_in_place(|| {
        print!("Photo destination directory: ");
        std::io::stdout().flush().ok()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok()?;
        Some(input)
    })
}

/// Exit status for a failed argument parse: help and version output exit 0,
/// every malformed invocation exits 1.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(&e));
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = config::Config::from_cli(cli)?;
    tracing::debug!(?config, "Starting grsync");

    let store = JsonStateFile::open(&config.config_path).await?;
    tracing::debug!("Using state file {}", store.path().display());
    let dest_dir = state::resolve_dest_dir(&store, config.dest_override.clone(), prompt_dest_dir)
        .await?;

    let shutdown_token = shutdown::install_signal_handler()?;

    let camera = CameraClient::new(&config.base_url)?;
    let sync_config = sync::SyncConfig {
        dest_dir,
        start: config.start.clone(),
        dry_run: config.dry_run,
        no_progress_bar: config.no_progress_bar,
    };
    run(&camera, &store, &config.poll, &sync_config, shutdown_token).await?;
    Ok(())
}

/// One session against the camera: wait for it, gate on battery, sync, then
/// tell it the session is over. A failed finish call is only logged.
async fn run(
    camera: &CameraClient,
    store: &dyn CheckpointStore,
    poll: &PollPolicy,
    sync_config: &sync::SyncConfig,
    shutdown_token: CancellationToken,
) -> anyhow::Result<sync::SyncSummary> {
    tracing::info!("Waiting for camera at {} ...", camera.base_url());
    retry::poll_until_ok(poll, &shutdown_token, || camera.ping())
        .await
        .context("Camera is not reachable")?;
    tracing::info!("Camera connected");

    let status = camera
        .status()
        .await
        .context("Failed to read camera status")?;
    camera::check_battery(&status)?;

    let summary = sync::run_sync(camera, store, sync_config, shutdown_token).await?;
    tracing::debug!(
        "{} of {} photos on the camera were considered this run",
        summary.worklist,
        summary.remote_total
    );

    if sync_config.dry_run {
        return Ok(summary);
    }

    match camera.finish().await {
        Ok(()) => tracing::info!("Camera session closed"),
        Err(e) => tracing::warn!("Could not close the camera session: {}", e),
    }

    if let Some(last) = store.last_copied().await? {
        tracing::info!("Last photo copied: {}", last);
    }
    if summary.failed > 0 {
        tracing::warn!(
            "{} photos could not be copied; they will be retried on a full sync (--all)",
            summary.failed
        );
    }

    Ok(summary)
}
