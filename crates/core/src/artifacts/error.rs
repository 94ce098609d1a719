//! Error types for the artifact store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from store bookkeeping.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An artifact with this id is already recorded.
    #[error("Artifact already recorded: {0}")]
    DuplicateArtifact(String),
}

/// Errors from a single download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Destination could not be prepared.
    #[error("Failed to create export directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Sink-specific failure.
    #[error("Download failed: {0}")]
    Other(String),
}

/// Errors releasing a content handle.
#[derive(Debug, Error)]
#[error("Failed to release content for {id}: {reason}")]
pub struct ReleaseError {
    pub id: String,
    pub reason: String,
}
