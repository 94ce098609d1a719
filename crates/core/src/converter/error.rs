//! Error types for the converter module.

use thiserror::Error;

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The converter cannot handle this source/target pair.
    #[error("Unsupported conversion: {from} -> {to}")]
    UnsupportedPair { from: String, to: String },

    /// Source content could not be decoded.
    #[error("Failed to decode {format} input: {reason}")]
    DecodeFailed { format: String, reason: String },

    /// Output could not be encoded.
    #[error("Failed to encode {format} output: {reason}")]
    EncodeFailed { format: String, reason: String },

    /// Conversion process failed.
    #[error("Conversion failed: {reason}")]
    ConversionFailed { reason: String },

    /// Blocking worker panicked or was cancelled.
    #[error("Conversion worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ConverterError {
    /// Creates an unsupported pair error.
    pub fn unsupported(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnsupportedPair {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Creates a new conversion failed error.
    pub fn conversion_failed(reason: impl Into<String>) -> Self {
        Self::ConversionFailed {
            reason: reason.into(),
        }
    }
}
