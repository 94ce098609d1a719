pub mod artifacts;
pub mod config;
pub mod converter;
pub mod estimator;
pub mod formats;
pub mod metrics;
pub mod queue;
pub mod testing;

pub use artifacts::{
    ArtifactStore, ContentReleaser, ConvertedArtifact, DirectorySink, DownloadError,
    DownloadSink, ExportReport,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError,
};
pub use converter::{
    Converter, ConverterConfig, ConverterError, RasterConverter, SimulatedConverter,
    StandardConverter,
};
pub use estimator::SizeEstimator;
pub use formats::{FormatCategory, FormatInfo};
pub use queue::{
    ActiveRun, ConversionQueue, EnqueueOutcome, FileStatus, QueueConfig, QueueError, QueueEvent,
    QueueStats, QueuedFile, SubmittedFile,
};
