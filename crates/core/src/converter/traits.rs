//! Trait definitions for the converter module.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionOutput, ConversionProgress};

/// A capability that converts file content from one format to another.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Returns the name of this converter implementation.
    fn name(&self) -> &str;

    /// Converts a file, reporting progress on `progress_tx`.
    ///
    /// Percentages sent must be non-decreasing. If the receiver is dropped,
    /// conversion continues without progress reporting.
    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError>;
}

#[async_trait]
impl<T: Converter + ?Sized> Converter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        (**self).convert(job, progress_tx).await
    }
}
