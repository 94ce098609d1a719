//! Types for the artifact store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully produced conversion output.
///
/// Shares its id with the queued file it came from. Never mutated after
/// creation; the content handle is released when the store discards it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedArtifact {
    /// Id of the originating queued file.
    pub id: String,
    /// Name of the submitted file.
    pub original_name: String,
    /// Name the converted file is offered under.
    pub converted_name: String,
    /// Source extension.
    pub source_format: String,
    /// Target extension.
    pub target_format: String,
    /// Size of the submitted file in bytes.
    pub original_size: u64,
    /// Size of the converted file in bytes (estimated if `size_estimated`).
    pub converted_size: u64,
    /// Whether `converted_size` comes from the estimator.
    pub size_estimated: bool,
    /// MIME type of the content.
    pub mime_type: String,
    /// When the conversion finished.
    pub converted_at: DateTime<Utc>,
    /// Downloadable content.
    #[serde(skip)]
    pub content: Bytes,
}

/// Outcome of exporting every artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    /// Ids exported successfully, in export order.
    pub exported: Vec<String>,
    /// Ids that failed, with the error message.
    pub failed: Vec<ExportFailure>,
}

/// One failed export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub id: String,
    pub error: String,
}

impl ExportReport {
    /// Total artifacts attempted.
    pub fn attempted(&self) -> usize {
        self.exported.len() + self.failed.len()
    }
}
