//! Testing utilities and mock implementations.
//!
//! This module provides a controllable [`MockConverter`] and a
//! [`RecordingSink`] so the queue and the artifact store can be exercised
//! end to end without real conversions or filesystem writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use fileshift_core::testing::{fixtures, MockConverter, RecordingSink};
//!
//! let converter = MockConverter::new();
//! let sink = RecordingSink::new();
//!
//! // Configure mock behavior
//! converter.fail_for("broken.jpg").await;
//! sink.fail_for("artifact-id").await;
//! ```

mod mock_converter;
mod recording_sink;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use recording_sink::RecordingSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use bytes::Bytes;
    use chrono::Utc;

    use crate::artifacts::ConvertedArtifact;
    use crate::converter::mime_type_for;
    use crate::formats::extension_of;
    use crate::queue::SubmittedFile;

    /// Create a submitted file of `size` bytes.
    pub fn source_file(name: &str, size: usize) -> SubmittedFile {
        SubmittedFile::new(name, Bytes::from(vec![0x2a; size]))
    }

    /// Create a submitted file with the given content.
    pub fn source_file_with(name: &str, content: &'static [u8]) -> SubmittedFile {
        SubmittedFile::new(name, Bytes::from_static(content))
    }

    /// Create a test artifact with reasonable defaults.
    pub fn artifact(id: &str, converted_name: &str) -> ConvertedArtifact {
        let target = extension_of(converted_name);
        let content = Bytes::from(format!("content of {}", converted_name));
        ConvertedArtifact {
            id: id.to_string(),
            original_name: format!("{}.jpg", id),
            converted_name: converted_name.to_string(),
            source_format: "jpg".to_string(),
            mime_type: mime_type_for(&target).to_string(),
            target_format: target,
            original_size: 2048,
            converted_size: content.len() as u64,
            size_estimated: false,
            converted_at: Utc::now(),
            content,
        }
    }
}
