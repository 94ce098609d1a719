//! Conversion run API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::error::ApiError;
use crate::state::AppState;

/// Request body for starting a run
#[derive(Debug, Deserialize)]
pub struct StartRunRequest {
    /// Target extension, with or without a leading dot
    pub target_format: String,
    /// Quality level of the target format, e.g. `high` for `jpg`
    #[serde(default)]
    pub quality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StartRunResponse {
    pub run_id: u64,
    pub target_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Files pending when the run was accepted
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct RunStatusResponse {
    pub running: bool,
    pub target_format: Option<String>,
}

/// Start converting every pending file.
///
/// Returns 202 once the run is claimed; progress is reported over the
/// WebSocket. Fails with 409 while another run is active.
pub async fn start_run(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartRunRequest>,
) -> Result<(StatusCode, Json<StartRunResponse>), ApiError> {
    let queue = state.queue();
    let quality = body.quality.map(|q| q.trim().to_lowercase());
    let run = queue.begin_run_with_quality(&body.target_format, quality.as_deref())?;
    let pending = queue.stats().await.pending;

    let response = StartRunResponse {
        run_id: run.id(),
        target_format: run.target_format().to_string(),
        quality,
        pending,
    };
    info!(
        run_id = run.id(),
        target = %run.target_format(),
        quality = ?response.quality,
        pending,
        "Accepted conversion run"
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let broadcaster = state.ws_broadcaster().clone();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            broadcaster.queue_event(event);
        }
        debug!("Run event stream closed");
    });

    tokio::spawn(async move {
        let artifacts = run.execute(Some(tx)).await;
        debug!(produced = artifacts.len(), "Conversion run task finished");
    });

    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Whether a run is active, and its target
pub async fn current_run(State(state): State<Arc<AppState>>) -> Json<RunStatusResponse> {
    let queue = state.queue();
    Json(RunStatusResponse {
        running: queue.is_running(),
        target_format: queue.current_target(),
    })
}
