use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::RemoteEntry;
use crate::retry::PollPolicy;
use crate::sync::reconcile::StartPoint;

const CONFIG_DIR_NAME: &str = "grsync";
const CONFIG_FILE_NAME: &str = "config.json";

/// Runtime configuration resolved from the command line.
///
/// The persisted half (destination directory and checkpoint) lives in
/// [`crate::state::JsonStateFile`]; this struct only carries per-invocation
/// choices.
#[derive(Debug)]
pub struct Config {
    pub base_url: String,
    pub config_path: PathBuf,
    pub dest_override: Option<PathBuf>,

    pub start: StartPoint,
    pub poll: PollPolicy,

    pub dry_run: bool,
    pub no_progress_bar: bool,
}

pub(crate) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Make a user-supplied path absolute against the current directory.
pub(crate) fn absolute_path(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine a config directory; pass --config"))?;
    Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

impl Config {
    pub fn from_cli(cli: crate::cli::Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.as_deref() {
            Some(p) => expand_tilde(p),
            None => default_config_path()?,
        };

        let dest_override = cli
            .dest
            .as_deref()
            .map(|d| absolute_path(&expand_tilde(d)))
            .transpose()?;

        let start = if cli.all {
            StartPoint::All
        } else if let (Some(dir), Some(file)) = (cli.dir, cli.file) {
            StartPoint::Marker(RemoteEntry::new(dir, file))
        } else {
            StartPoint::Resume
        };

        let poll = PollPolicy {
            interval: Duration::from_secs(cli.poll_interval),
            max_attempts: cli.max_poll_attempts,
        };

        Ok(Self {
            base_url: cli.base_url.trim_end_matches('/').to_string(),
            config_path,
            dest_override,
            start,
            poll,
            dry_run: cli.dry_run,
            no_progress_bar: cli.no_progress_bar,
        })
    }
}
