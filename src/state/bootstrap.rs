use std::path::PathBuf;

use anyhow::Context;

use super::store::CheckpointStore;
use crate::config::{absolute_path, expand_tilde};

/// Decide where photos go.
///
/// An explicit `--dest` wins and is saved. Otherwise the stored value is
/// used; on first run `prompt` is asked once and the answer is saved.
pub async fn resolve_dest_dir<F>(
    store: &dyn CheckpointStore,
    dest_override: Option<PathBuf>,
    prompt: F,
) -> anyhow::Result<PathBuf>
where
    F: Fn() -> Option<String>,
{
    if let Some(dest) = dest_override {
        store
            .set_dest_dir(&dest)
            .await
            .context("Saving destination directory")?;
        return Ok(dest);
    }

    if let Some(dest) = store.dest_dir().await? {
        return Ok(dest);
    }

    let answer = prompt()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("No destination directory configured; pass --dest <DIR>")
        })?;

    let dest = absolute_path(&expand_tilde(&answer))?;
    store
        .set_dest_dir(&dest)
        .await
        .context("Saving destination directory")?;
    tracing::info!("Photos will be saved to {}", dest.display());
    Ok(dest)
}
