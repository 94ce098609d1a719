//! Side-effect capabilities injected into the artifact store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::{DownloadError, ReleaseError};
use super::types::ConvertedArtifact;

/// Delivers one artifact to the user.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Delivers a single artifact.
    async fn download(&self, artifact: &ConvertedArtifact) -> Result<(), DownloadError>;
}

/// Releases the resources behind an artifact's content handle.
pub trait ContentReleaser: Send + Sync {
    fn release(&self, artifact: &ConvertedArtifact) -> Result<(), ReleaseError>;
}

/// Releaser for in-memory content: dropping the handle is the release.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropReleaser;

impl ContentReleaser for DropReleaser {
    fn release(&self, artifact: &ConvertedArtifact) -> Result<(), ReleaseError> {
        debug!(id = %artifact.id, bytes = artifact.content.len(), "Releasing artifact content");
        Ok(())
    }
}

/// Writes artifacts into a directory under their converted names.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn download(&self, artifact: &ConvertedArtifact) -> Result<(), DownloadError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DownloadError::Directory {
                path: self.dir.clone(),
                source,
            })?;

        // Only the final component of the name, never a path
        let file_name = Path::new(&artifact.converted_name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| artifact.id.clone().into());
        let path = self.dir.join(file_name);

        tokio::fs::write(&path, &artifact.content)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;

        info!(id = %artifact.id, path = %path.display(), "Exported artifact");
        Ok(())
    }
}
