//! Default converter: real raster conversion, simulation for everything else.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::raster::RasterConverter;
use super::simulated::SimulatedConverter;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionOutput, ConversionProgress};

/// Routes raster image pairs to [`RasterConverter`] and all other pairs to
/// [`SimulatedConverter`].
#[derive(Debug, Clone, Default)]
pub struct StandardConverter {
    raster: RasterConverter,
    fallback: SimulatedConverter,
}

impl StandardConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            raster: RasterConverter::new(),
            fallback: SimulatedConverter::new(config),
        }
    }
}

#[async_trait]
impl Converter for StandardConverter {
    fn name(&self) -> &str {
        "standard"
    }

    async fn convert(
        &self,
        job: ConversionJob,
        progress_tx: mpsc::Sender<ConversionProgress>,
    ) -> Result<ConversionOutput, ConverterError> {
        if RasterConverter::can_convert(&job.source_format, &job.target_format) {
            debug!(file_id = %job.file_id, "Using raster converter");
            self.raster.convert(job, progress_tx).await
        } else {
            debug!(file_id = %job.file_id, "Using simulated converter");
            self.fallback.convert(job, progress_tx).await
        }
    }
}
