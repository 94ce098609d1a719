use sha2::{Digest, Sha256};
use std::sync::Arc;

use fileshift_core::{ConversionQueue, Config, Converter, DownloadSink};

use crate::api::WsBroadcaster;

/// Queue type served by the API, with the converter chosen at startup.
pub type SharedQueue = Arc<ConversionQueue<Arc<dyn Converter>>>;

/// Shared application state
pub struct AppState {
    config: Config,
    config_hash: String,
    queue: SharedQueue,
    export_sink: Arc<dyn DownloadSink>,
    ws_broadcaster: WsBroadcaster,
}

impl AppState {
    pub fn new(
        config: Config,
        queue: SharedQueue,
        export_sink: Arc<dyn DownloadSink>,
        ws_broadcaster: WsBroadcaster,
    ) -> Self {
        let config_hash = config_hash(&config);
        Self {
            config,
            config_hash,
            queue,
            export_sink,
            ws_broadcaster,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Short SHA-256 of the serialized configuration.
    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn queue(&self) -> &SharedQueue {
        &self.queue
    }

    pub fn export_sink(&self) -> &dyn DownloadSink {
        self.export_sink.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }
}

/// Computes a short, stable hash of the configuration.
pub fn config_hash(config: &Config) -> String {
    let config_json = serde_json::to_string(config).unwrap_or_default();
    let digest = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    digest[..16].to_string()
}
