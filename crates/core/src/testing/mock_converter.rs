//! Mock converter for testing.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::converter::{
    mime_type_for, ConversionJob, ConversionOutput, ConversionProgress, Converter, ConverterError,
};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Provides controllable behavior for testing:
/// - Track conversion jobs for assertions
/// - Simulate failures, once or per file name
/// - Simulate progress updates and conversion time
/// - Produce empty or non-authoritative output
///
/// # Example
///
/// ```rust,ignore
/// use fileshift_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_for("broken.jpg").await;
///
/// // ... run the queue ...
///
/// let conversions = converter.recorded_conversions().await;
/// assert_eq!(conversions.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// If set, the next conversion will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// File names that always fail.
    failing_names: Arc<RwLock<HashSet<String>>>,
    /// Simulated conversion duration.
    conversion_duration: Arc<RwLock<Duration>>,
    /// Number of progress updates sent per conversion (0 disables them).
    progress_steps: Arc<RwLock<u32>>,
    /// Whether to return empty content.
    empty_output: Arc<RwLock<bool>>,
    /// Whether output content is reported as authoritative.
    authoritative: Arc<RwLock<bool>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter that converts instantly.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            failing_names: Arc::new(RwLock::new(HashSet::new())),
            conversion_duration: Arc::new(RwLock::new(Duration::ZERO)),
            progress_steps: Arc::new(RwLock::new(4)),
            empty_output: Arc::new(RwLock::new(false)),
            authoritative: Arc::new(RwLock::new(true)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Get the number of conversions performed.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Names of the files submitted, in call order.
    pub async fn converted_names(&self) -> Vec<String> {
        self.conversions
            .read()
            .await
            .iter()
            .map(|c| c.job.file_name.clone())
            .collect()
    }

    /// Configure the next conversion to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every conversion of `file_name` fail.
    pub async fn fail_for(&self, file_name: &str) {
        self.failing_names
            .write()
            .await
            .insert(file_name.to_string());
    }

    /// Set the simulated conversion duration.
    pub async fn set_conversion_duration(&self, duration: Duration) {
        *self.conversion_duration.write().await = duration;
    }

    /// Set how many progress updates each conversion sends.
    pub async fn set_progress_steps(&self, steps: u32) {
        *self.progress_steps.write().await = steps;
    }

    /// Return empty content from successful conversions.
    pub async fn set_empty_output(&self, empty: bool) {
        *self.empty_output.write().await = empty;
    }

    /// Mark output content as authoritative or not.
    pub async fn set_authoritative(&self, authoritative: bool) {
        *self.authoritative.write().await = authoritative;
    }

    /// Take the error for this job, if any.
    async fn take_error(&self, job: &ConversionJob) -> Option<ConverterError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        if self.failing_names.read().await.contains(&job.file_name) {
            return Some(ConverterError::conversion_failed(format!(
                "mock failure for {}",
                job.file_name
            )));
        }
        None
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        let steps = *self.progress_steps.read().await;
        let duration = *self.conversion_duration.read().await;

        if steps > 0 {
            let step_duration = duration / steps;
            for i in 0..steps {
                let percent = (i + 1) as f32 * 100.0 / steps as f32;
                let _ = progress_tx
                    .send(ConversionProgress::new(job.file_id.clone(), percent))
                    .await;
                if !step_duration.is_zero() {
                    tokio::time::sleep(step_duration).await;
                }
            }
        } else if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }

        if let Some(err) = self.take_error(&job).await {
            self.conversions.write().await.push(RecordedConversion {
                job,
                success: false,
            });
            return Err(err);
        }

        let content = if *self.empty_output.read().await {
            Bytes::new()
        } else {
            Bytes::from(format!("converted:{}", job.file_name))
        };
        let output = ConversionOutput {
            content,
            mime_type: mime_type_for(&job.target_format).to_string(),
            authoritative: *self.authoritative.read().await,
        };

        self.conversions.write().await.push(RecordedConversion {
            job,
            success: true,
        });

        Ok(output)
    }
}
