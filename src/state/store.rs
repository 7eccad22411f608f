//! Checkpoint store trait and its JSON file implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::StateError;

/// Get/set access to the two persisted values the sync consumes.
///
/// Object-safe so the sync engine can take `&dyn CheckpointStore`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Identifier (`"dir/file"`) of the last photo successfully copied.
    async fn last_copied(&self) -> Result<Option<String>, StateError>;

    /// Record `id` as the last photo copied. Must be durable on return.
    async fn record_copied(&self, id: &str) -> Result<(), StateError>;

    async fn dest_dir(&self) -> Result<Option<PathBuf>, StateError>;

    async fn set_dest_dir(&self, dir: &Path) -> Result<(), StateError>;
}

/// On-disk shape of the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_dest_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_image_copied: Option<String>,
    /// Keys written by other tools are carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// JSON config file, read once on open and rewritten on every change.
pub struct JsonStateFile {
    path: PathBuf,
    state: Mutex<PersistedState>,
}

impl std::fmt::Debug for JsonStateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStateFile")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonStateFile {
    /// Open the file at `path`; a missing file is an empty record.
    pub async fn open(path: &Path) -> Result<Self, StateError> {
        let state = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StateError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {}, starting fresh", path.display());
                PersistedState::default()
            }
            Err(e) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write and fsync a sibling temp file, then rename it over the real
    /// one. A crash mid-write leaves the previous record intact.
    async fn persist(&self, state: &PersistedState) -> Result<(), StateError> {
        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_vec_pretty(state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .await
            .map_err(write_err)?;
        file.write_all(&json).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(write_err)?;
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for JsonStateFile {
    async fn last_copied(&self) -> Result<Option<String>, StateError> {
        Ok(self.state.lock().await.last_image_copied.clone())
    }

    async fn record_copied(&self, id: &str) -> Result<(), StateError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.last_image_copied = Some(id.to_string());
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }

    async fn dest_dir(&self) -> Result<Option<PathBuf>, StateError> {
        Ok(self.state.lock().await.photo_dest_dir.clone())
    }

    async fn set_dest_dir(&self, dir: &Path) -> Result<(), StateError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        next.photo_dest_dir = Some(dir.to_path_buf());
        self.persist(&next).await?;
        *state = next;
        Ok(())
    }
}
