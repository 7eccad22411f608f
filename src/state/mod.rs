//! Persisted sync state.
//!
//! A single JSON file holds the destination directory and the resume
//! checkpoint (`lastImageCopied`). The sync engine only sees it through the
//! [`CheckpointStore`] get/set trait.

pub mod bootstrap;
pub mod error;
pub mod store;

pub use bootstrap::resolve_dest_dir;
pub use error::StateError;
pub use store::{CheckpointStore, JsonStateFile};
