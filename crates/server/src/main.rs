use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fileshift_core::{
    load_config, load_config_from_env, validate_config, ArtifactStore, Config, ConfigError,
    ConversionQueue, Converter, DirectorySink, DownloadSink, StandardConverter,
};
use fileshift_server::api::{create_router, WsBroadcaster};
use fileshift_server::state::AppState;

/// Interval between WebSocket heartbeats
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("FILESHIFT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    let config = load(&config_path)?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        max_file_size = config.queue.max_file_size_bytes,
        export_dir = %config.export.output_dir.display(),
        "Queue and export settings"
    );
    info!("Config hash: {}", fileshift_server::state::config_hash(&config));

    // Converter backend
    let converter: Arc<dyn Converter> =
        Arc::new(StandardConverter::new(config.converter.clone()));
    info!("Using converter: {}", converter.name());

    // Queue with its artifact store
    let store = Arc::new(ArtifactStore::new().with_pacing_delay(config.export.pacing_delay()));
    let queue = Arc::new(ConversionQueue::new(config.queue.clone(), converter).with_store(store));

    let export_sink: Arc<dyn DownloadSink> =
        Arc::new(DirectorySink::new(config.export.output_dir.clone()));

    let ws_broadcaster = WsBroadcaster::default();
    let heartbeat = {
        let broadcaster = ws_broadcaster.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(HEARTBEAT_INTERVAL);
            loop {
                interval.tick().await;
                broadcaster.heartbeat();
            }
        })
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&queue),
        export_sink,
        ws_broadcaster,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    heartbeat.abort();

    // Abandon any active run and release artifacts
    queue.clear().await;
    info!("Queue cleared");

    Ok(())
}

/// Load the config file, falling back to defaults plus environment overrides
/// when it does not exist.
fn load(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            warn!("Config file {:?} not found, using defaults", path);
            load_config_from_env().context("Failed to load config from environment")
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config from {:?}", path)),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
