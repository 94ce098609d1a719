//! Types for the conversion queue.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifacts::ConvertedArtifact;
use crate::formats::{format_file_size, FormatInfo};

/// A raw file handed to the queue.
#[derive(Debug, Clone)]
pub struct SubmittedFile {
    /// Original file name.
    pub name: String,
    /// File content.
    pub content: Bytes,
}

impl SubmittedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Lifecycle state of a queued file.
///
/// `pending → converting → {completed | failed}`. Nothing leaves `completed`
/// or `failed` except removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FileStatus {
    /// Waiting for a run.
    Pending,
    /// Being converted.
    Converting { progress: f32 },
    /// Converted; the artifact shares the file id.
    Completed { artifact_id: String },
    /// Conversion was impossible or failed.
    Failed { error: String },
}

impl FileStatus {
    /// Returns the state tag ("pending", "converting", ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Converting { .. } => "converting",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }

    /// Progress percentage: 100 only when completed.
    pub fn progress(&self) -> f32 {
        match self {
            Self::Pending | Self::Failed { .. } => 0.0,
            Self::Converting { progress } => *progress,
            Self::Completed { .. } => 100.0,
        }
    }

    /// Error message, present only when failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_converting(&self) -> bool {
        matches!(self, Self::Converting { .. })
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Highest progress a converting file can report before it is completed.
const MAX_CONVERTING_PROGRESS: f32 = 99.9;

/// One submitted file and its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedFile {
    /// Opaque unique id.
    pub id: String,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase extension.
    pub extension: String,
    /// Catalog info for the extension.
    pub format: FormatInfo,
    /// Lifecycle state.
    pub status: FileStatus,
    /// When the file was enqueued.
    pub added_at: DateTime<Utc>,
}

impl QueuedFile {
    pub fn progress(&self) -> f32 {
        self.status.progress()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    /// `pending → converting`. Returns whether the transition happened.
    pub(crate) fn begin_converting(&mut self) -> bool {
        if !self.status.is_pending() {
            return false;
        }
        self.status = FileStatus::Converting { progress: 0.0 };
        true
    }

    /// Raises the progress of a converting file. Lower values are ignored.
    ///
    /// Progress stays below 100 until the file is completed.
    pub(crate) fn advance(&mut self, percent: f32) -> bool {
        match &mut self.status {
            FileStatus::Converting { progress } => {
                let next = percent.clamp(0.0, MAX_CONVERTING_PROGRESS);
                if next > *progress {
                    *progress = next;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// `converting → completed`.
    pub(crate) fn complete(&mut self, artifact_id: impl Into<String>) -> bool {
        if !self.status.is_converting() {
            return false;
        }
        self.status = FileStatus::Completed {
            artifact_id: artifact_id.into(),
        };
        true
    }

    /// `pending | converting → failed`.
    pub(crate) fn fail(&mut self, error: impl Into<String>) -> bool {
        if !(self.status.is_pending() || self.status.is_converting()) {
            return false;
        }
        self.status = FileStatus::Failed {
            error: error.into(),
        };
        true
    }
}

/// Why a submitted file was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("File is empty")]
    Empty,

    #[error("File size exceeds {} limit ({})", format_file_size(*.limit), format_file_size(*.size))]
    TooLarge { size: u64, limit: u64 },

    #[error("File has no extension")]
    MissingExtension,
}

/// A submitted file that failed validation, with every reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub name: String,
    pub size: u64,
    pub errors: Vec<ValidationError>,
}

/// Result of an enqueue batch.
#[derive(Debug, Clone, Default)]
pub struct EnqueueOutcome {
    /// Records appended to the queue, in submission order.
    pub accepted: Vec<QueuedFile>,
    /// Files refused, in submission order.
    pub rejected: Vec<RejectedFile>,
}

/// Aggregate counts over the queue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub completed: usize,
    pub errors: usize,
    pub pending: usize,
    pub converting: usize,
    /// `100 * completed / total`, 0 for an empty queue.
    pub progress_percent: f64,
}

impl QueueStats {
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a QueuedFile>) -> Self {
        let mut stats = Self::default();
        for file in files {
            stats.total += 1;
            match file.status {
                FileStatus::Pending => stats.pending += 1,
                FileStatus::Converting { .. } => stats.converting += 1,
                FileStatus::Completed { .. } => stats.completed += 1,
                FileStatus::Failed { .. } => stats.errors += 1,
            }
        }
        if stats.total > 0 {
            stats.progress_percent = 100.0 * stats.completed as f64 / stats.total as f64;
        }
        stats
    }
}

/// Events emitted while a run progresses.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueueEvent {
    /// A run began.
    RunStarted {
        run_id: u64,
        target_format: String,
        total: usize,
    },
    /// A file changed state or progress. `index` is its position in the run.
    Progress {
        file: QueuedFile,
        index: usize,
        total: usize,
    },
    /// A file produced an artifact.
    FileCompleted { artifact: ConvertedArtifact },
    /// A file failed (unsupported pair or conversion failure).
    FileFailed {
        file: QueuedFile,
        index: usize,
        total: usize,
    },
    /// Every file of the run was visited.
    RunFinished {
        run_id: u64,
        converted: usize,
        failed: usize,
    },
}
