//! Error types for the conversion queue.

use thiserror::Error;

/// Errors from queue operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Another run holds the queue.
    #[error("A conversion run is already in progress")]
    RunInProgress,

    /// The requested target is not in the format catalog.
    #[error("Unknown target format: {0}")]
    UnknownTargetFormat(String),

    /// The target format has no quality level with this name.
    #[error("Unknown quality '{quality}' for format {target}")]
    UnknownQuality { target: String, quality: String },

    /// No file with this id is queued.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The file is being converted by the active run.
    #[error("File is being converted: {0}")]
    FileBusy(String),
}
