//! Choosing which part of the camera's photo list to fetch.
//!
//! The photo list is in camera order, which is chronological, so every mode
//! reduces to a start index and the worklist is the tail from there.

use super::error::ReconcileError;
use crate::camera::RemoteEntry;

/// Where the caller asked the sync to begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartPoint {
    /// Everything on the camera.
    All,
    /// After the stored checkpoint, or everything if there is none.
    Resume,
    /// From this photo onwards (inclusive).
    Marker(RemoteEntry),
}

/// Compute the index of the first photo to consider.
///
/// `All` starts at 0. A marker starts at its own position and is an error if
/// the camera does not have it. `Resume` starts after the stored checkpoint,
/// falling back to 0 with a warning when the checkpoint is missing from the
/// list or was never written.
pub fn start_index(
    photos: &[RemoteEntry],
    start: &StartPoint,
    checkpoint: Option<&str>,
) -> Result<usize, ReconcileError> {
    match start {
        StartPoint::All => Ok(0),
        StartPoint::Marker(marker) => photos
            .iter()
            .position(|p| p == marker)
            .ok_or_else(|| ReconcileError::MarkerNotFound {
                marker: marker.id(),
            }),
        StartPoint::Resume => {
            let Some(checkpoint) = checkpoint else {
                return Ok(0);
            };
            Ok(match photos.iter().position(|p| p.matches_id(checkpoint)) {
                Some(pos) => pos + 1,
                None => {
                    tracing::warn!(
                        "Last copied photo {} is no longer on the camera, rescanning everything",
                        checkpoint
                    );
                    0
                }
            })
        }
    }
}

/// The ordered tail of `photos` this run should work through. Empty when the
/// checkpoint is the last photo on the camera.
pub fn worklist<'a>(
    photos: &'a [RemoteEntry],
    start: &StartPoint,
    checkpoint: Option<&str>,
) -> Result<&'a [RemoteEntry], ReconcileError> {
    let index = start_index(photos, start, checkpoint)?;
    Ok(&photos[index..])
}
