//! In-memory artifact store.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::metrics::EXPORTS_TOTAL;

use super::error::StoreError;
use super::traits::{ContentReleaser, DownloadSink, DropReleaser};
use super::types::{ConvertedArtifact, ExportFailure, ExportReport};

/// Default delay between consecutive exports.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(500);

/// Owns completed artifacts in completion order.
pub struct ArtifactStore {
    artifacts: RwLock<Vec<ConvertedArtifact>>,
    releaser: Arc<dyn ContentReleaser>,
    pacing_delay: Duration,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore {
    /// Creates an empty store with the default pacing and releaser.
    pub fn new() -> Self {
        Self {
            artifacts: RwLock::new(Vec::new()),
            releaser: Arc::new(DropReleaser),
            pacing_delay: DEFAULT_PACING_DELAY,
        }
    }

    /// Sets the delay inserted between consecutive exports.
    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    /// Sets the releaser called for each discarded artifact.
    pub fn with_releaser(mut self, releaser: Arc<dyn ContentReleaser>) -> Self {
        self.releaser = releaser;
        self
    }

    pub fn pacing_delay(&self) -> Duration {
        self.pacing_delay
    }

    /// Appends an artifact.
    pub async fn record(&self, artifact: ConvertedArtifact) -> Result<(), StoreError> {
        let mut artifacts = self.artifacts.write().await;
        if artifacts.iter().any(|a| a.id == artifact.id) {
            return Err(StoreError::DuplicateArtifact(artifact.id));
        }
        artifacts.push(artifact);
        Ok(())
    }

    /// Looks up an artifact by id.
    pub async fn get(&self, id: &str) -> Option<ConvertedArtifact> {
        self.artifacts
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    /// All artifacts in completion order.
    pub async fn all(&self) -> Vec<ConvertedArtifact> {
        self.artifacts.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.artifacts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.artifacts.read().await.is_empty()
    }

    /// Releases every content handle, then empties the store.
    ///
    /// Release failures are logged and never stop the sweep. Calling this on
    /// an empty store is a no-op.
    pub async fn release_all(&self) {
        let drained = std::mem::take(&mut *self.artifacts.write().await);
        if drained.is_empty() {
            return;
        }

        let count = drained.len();
        for artifact in &drained {
            if let Err(e) = self.releaser.release(artifact) {
                warn!(id = %artifact.id, error = %e, "Failed to release artifact content");
            }
        }

        info!(count, "Released all artifacts");
    }

    /// Delivers every artifact through `sink`, in order, pacing between calls.
    ///
    /// A failed delivery is logged and recorded in the report; the remaining
    /// artifacts are still exported.
    pub async fn export_all(&self, sink: &dyn DownloadSink) -> ExportReport {
        let artifacts = self.all().await;
        let mut report = ExportReport::default();

        if artifacts.is_empty() {
            warn!("No artifacts to export");
            return report;
        }

        info!(count = artifacts.len(), "Starting export of all artifacts");

        for (idx, artifact) in artifacts.iter().enumerate() {
            if idx > 0 && !self.pacing_delay.is_zero() {
                tokio::time::sleep(self.pacing_delay).await;
            }

            match sink.download(artifact).await {
                Ok(()) => {
                    EXPORTS_TOTAL.with_label_values(&["success"]).inc();
                    report.exported.push(artifact.id.clone());
                }
                Err(e) => {
                    EXPORTS_TOTAL.with_label_values(&["failure"]).inc();
                    warn!(
                        id = %artifact.id,
                        name = %artifact.converted_name,
                        error = %e,
                        "Export failed, continuing with remaining artifacts"
                    );
                    report.failed.push(ExportFailure {
                        id: artifact.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
