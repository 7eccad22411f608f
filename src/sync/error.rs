use thiserror::Error;

use crate::camera::CameraError;

/// Per-photo fetch failures. None of these stop the sync: the photo is
/// logged, counted, and the loop moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("Transfer of {path} failed after {bytes_written} bytes: {source}")]
    Body {
        path: String,
        bytes_written: u64,
        source: reqwest::Error,
    },

    #[error("Disk error writing {path}: {source}")]
    Disk {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Start photo {marker} is not on the camera")]
    MarkerNotFound { marker: String },
}
