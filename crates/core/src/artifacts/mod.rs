//! Artifact store: completed conversion outputs.
//!
//! Artifacts are kept in completion order. Side effects (delivering an
//! artifact to the user, releasing its content) go through the injected
//! [`DownloadSink`] and [`ContentReleaser`] capabilities.

mod error;
mod store;
mod traits;
mod types;

pub use error::{DownloadError, ReleaseError, StoreError};
pub use store::{ArtifactStore, DEFAULT_PACING_DELAY};
pub use traits::{ContentReleaser, DirectorySink, DownloadSink, DropReleaser};
pub use types::{ConvertedArtifact, ExportFailure, ExportReport};
