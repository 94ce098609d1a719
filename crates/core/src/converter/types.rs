//! Types for the converter module.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::formats::QualitySetting;

/// A single-file conversion request.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Id of the queued file being converted.
    pub file_id: String,
    /// Original file name.
    pub file_name: String,
    /// Source extension.
    pub source_format: String,
    /// Target extension.
    pub target_format: String,
    /// Requested output quality. `None` uses the encoder default.
    pub quality: Option<QualitySetting>,
    /// Source content.
    pub content: Bytes,
}

impl ConversionJob {
    /// Size of the source content in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Output of a successful conversion.
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// Converted content.
    pub content: Bytes,
    /// MIME type of the converted content.
    pub mime_type: String,
    /// Whether `content` is the real converted file.
    ///
    /// Simulated conversions produce a placeholder whose length says nothing
    /// about the size a real conversion would have.
    pub authoritative: bool,
}

impl ConversionOutput {
    /// Whether the output carries any content at all.
    pub fn is_usable(&self) -> bool {
        !self.content.is_empty()
    }
}

/// Progress update during conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionProgress {
    /// Id of the file being converted.
    pub file_id: String,
    /// Progress percentage (0.0 - 100.0).
    pub percent: f32,
}

impl ConversionProgress {
    pub fn new(file_id: impl Into<String>, percent: f32) -> Self {
        Self {
            file_id: file_id.into(),
            percent: percent.clamp(0.0, 100.0),
        }
    }
}

/// Best-effort MIME type for an extension.
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "zip" => "application/zip",
        "epub" => "application/epub+zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(ConversionProgress::new("a", 150.0).percent, 100.0);
        assert_eq!(ConversionProgress::new("a", -3.0).percent, 0.0);
    }

    #[test]
    fn test_output_usable() {
        let empty = ConversionOutput {
            content: Bytes::new(),
            mime_type: "text/plain".to_string(),
            authoritative: false,
        };
        assert!(!empty.is_usable());
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("jpeg"), "image/jpeg");
        assert_eq!(mime_type_for("dwg"), "application/octet-stream");
    }
}
