use std::sync::LazyLock;

use clap::Parser;
use regex::Regex;

use crate::types::LogLevel;

static DIR_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9]\d\dRICOH$").expect("valid directory regex"));
static FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^R0\d{6}\.JPG$").expect("valid file regex"));

#[derive(Parser, Debug)]
#[command(
    name = "grsync",
    version,
    about = "Sync photos from a WiFi-connected camera to a local directory",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Sync every photo on the camera, ignoring the stored checkpoint
    #[arg(long, conflicts_with_all = ["dir", "file", "resume"])]
    pub all: bool,

    /// Camera directory of the first photo to sync (e.g. 100RICOH)
    #[arg(long, value_name = "DIRNAME", requires = "file", value_parser = parse_dir_name)]
    pub dir: Option<String>,

    /// File name of the first photo to sync (e.g. R0000005.JPG)
    #[arg(long, value_name = "FILENAME", requires = "dir", value_parser = parse_file_name)]
    pub file: Option<String>,

    /// Continue after the last photo copied by a previous run
    #[arg(long, conflicts_with_all = ["dir", "file"])]
    pub resume: bool,

    /// Local destination directory (saved for later runs)
    #[arg(long)]
    pub dest: Option<String>,

    /// Camera API base URL
    #[arg(long, env = "GRSYNC_BASE_URL", default_value = "http://192.168.0.1")]
    pub base_url: String,

    /// Path of the JSON config file holding the destination and checkpoint
    #[arg(long, env = "GRSYNC_CONFIG")]
    pub config: Option<String>,

    /// Seconds between connectivity checks while waiting for the camera
    #[arg(long, default_value_t = 1)]
    pub poll_interval: u64,

    /// Give up waiting for the camera after N connectivity checks
    #[arg(long)]
    pub max_poll_attempts: Option<u32>,

    /// Show what would be downloaded without touching disk or camera
    #[arg(long)]
    pub dry_run: bool,

    /// Disable progress bar
    #[arg(long)]
    pub no_progress_bar: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

fn parse_dir_name(s: &str) -> Result<String, String> {
    if DIR_NAME_RE.is_match(s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "'{s}' is not a camera directory name (expected e.g. 100RICOH)"
        ))
    }
}

fn parse_file_name(s: &str) -> Result<String, String> {
    if FILE_NAME_RE.is_match(s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "'{s}' is not a camera file name (expected e.g. R0000005.JPG)"
        ))
    }
}
