//! Simulated conversion producing a placeholder payload.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::formats::format_file_size;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionOutput, ConversionProgress};

/// Converter that only pretends to convert.
///
/// Progress is reported in `progress_steps` evenly spaced increments over a
/// duration derived from the input size. The output is a short text note
/// describing the requested conversion and is not authoritative.
#[derive(Debug, Clone, Default)]
pub struct SimulatedConverter {
    config: ConverterConfig,
}

impl SimulatedConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    fn placeholder(job: &ConversionJob) -> Bytes {
        let text = format!(
            "Converted file: {} -> {}\nOriginal size: {}\nConverted at: {}",
            job.file_name,
            job.target_format,
            format_file_size(job.size_bytes()),
            Utc::now().to_rfc3339()
        );
        Bytes::from(text)
    }
}

#[async_trait]
impl Converter for SimulatedConverter {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        let steps = self.config.progress_steps.max(1);
        let step_time = self.config.simulated_duration(job.size_bytes()) / steps;

        debug!(
            file_id = %job.file_id,
            target = %job.target_format,
            steps,
            "Simulating conversion"
        );

        for step in 0..=steps {
            let percent = step as f32 * 100.0 / steps as f32;
            let _ = progress_tx
                .send(ConversionProgress::new(&job.file_id, percent))
                .await;

            if step < steps && !step_time.is_zero() {
                tokio::time::sleep(step_time).await;
            }
        }

        Ok(ConversionOutput {
            content: Self::placeholder(&job),
            mime_type: "text/plain".to_string(),
            authoritative: false,
        })
    }
}
