//! Download sink that records deliveries.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::artifacts::{ConvertedArtifact, DownloadError, DownloadSink};

/// Records every download attempt in order.
///
/// Attempts for ids registered with [`RecordingSink::fail_for`] are recorded
/// and then fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    attempts: Arc<RwLock<Vec<ConvertedArtifact>>>,
    failing_ids: Arc<RwLock<HashSet<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make downloads of artifact `id` fail.
    pub async fn fail_for(&self, id: &str) {
        self.failing_ids.write().await.insert(id.to_string());
    }

    /// Ids of every attempted download, in order.
    pub async fn downloaded_ids(&self) -> Vec<String> {
        self.attempts
            .read()
            .await
            .iter()
            .map(|a| a.id.clone())
            .collect()
    }

    /// Every artifact handed to the sink, in order.
    pub async fn downloaded(&self) -> Vec<ConvertedArtifact> {
        self.attempts.read().await.clone()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn download(&self, artifact: &ConvertedArtifact) -> Result<(), DownloadError> {
        self.attempts.write().await.push(artifact.clone());
        if self.failing_ids.read().await.contains(&artifact.id) {
            return Err(DownloadError::Other(format!(
                "mock failure for {}",
                artifact.id
            )));
        }
        Ok(())
    }
}
