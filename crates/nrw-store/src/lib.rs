//! Snapshot, zone and intervention storage behind the `nrw-core` seams
//!
//! [`JsonlStore`] keeps append-only JSON-lines files in a directory;
//! [`MemoryStore`] keeps everything in memory for tests and demos.

pub mod jsonl;
pub mod memory;

pub use jsonl::*;
pub use memory::*;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
