use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{artifacts, files, formats, handlers, middleware::metrics_middleware, runs, ws};
use crate::state::AppState;

/// Extra room in an upload body beyond the file content itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Largest number of max-size files one upload may carry.
const FILES_PER_UPLOAD: u64 = 10;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = upload_body_limit(state.config().queue.max_file_size_bytes);

    // API routes
    let api_routes = Router::new()
        // Health, config and observability
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/stats", get(handlers::get_stats))
        .route("/metrics", get(handlers::metrics))
        .route("/ws", get(ws::ws_handler))
        // Format catalog
        .route("/formats", get(formats::list_formats))
        .route("/formats/search", get(formats::search))
        .route("/formats/{ext}", get(formats::get_format))
        .route("/presets", get(formats::list_presets))
        .route("/presets/{key}", get(formats::get_preset))
        // Queue
        .route(
            "/files",
            post(files::upload_files).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/files", get(files::list_files))
        .route("/files", delete(files::clear_files))
        .route("/files/{id}", get(files::get_file))
        .route("/files/{id}", delete(files::delete_file))
        // Runs
        .route("/runs", post(runs::start_run))
        .route("/runs/current", get(runs::current_run))
        // Artifacts
        .route("/artifacts", get(artifacts::list_artifacts))
        .route("/artifacts", delete(artifacts::release_artifacts))
        .route("/artifacts/export", post(artifacts::export_artifacts))
        .route("/artifacts/{id}", get(artifacts::get_artifact))
        .route("/artifacts/{id}/download", get(artifacts::download_artifact))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Body limit for uploads, large enough that an oversized file reaches
/// validation and is reported as rejected.
fn upload_body_limit(max_file_size: u64) -> usize {
    max_file_size
        .saturating_mul(FILES_PER_UPLOAD)
        .saturating_add(MULTIPART_OVERHEAD_BYTES)
        .try_into()
        .unwrap_or(usize::MAX)
}
