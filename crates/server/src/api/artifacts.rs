//! Converted artifact API handlers.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use fileshift_core::{ConvertedArtifact, ExportReport};

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ListArtifactsResponse {
    pub artifacts: Vec<ConvertedArtifact>,
    pub total: usize,
}

/// List artifacts in completion order
pub async fn list_artifacts(State(state): State<Arc<AppState>>) -> Json<ListArtifactsResponse> {
    let artifacts = state.queue().artifacts().all().await;
    Json(ListArtifactsResponse {
        total: artifacts.len(),
        artifacts,
    })
}

pub async fn get_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ConvertedArtifact>, ApiError> {
    find(&state, &id).await.map(Json)
}

/// Serve the converted content as an attachment.
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let artifact = find(&state, &id).await?;

    let content_type = HeaderValue::from_str(&artifact.mime_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(&artifact.converted_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from(artifact.content),
    )
        .into_response())
}

/// Export every artifact through the configured sink.
///
/// Individual failures are listed in the report and never abort the export.
pub async fn export_artifacts(State(state): State<Arc<AppState>>) -> Json<ExportReport> {
    let report = state
        .queue()
        .artifacts()
        .export_all(state.export_sink())
        .await;

    info!(
        exported = report.exported.len(),
        failed = report.failed.len(),
        "Export finished"
    );
    state.ws_broadcaster().export_finished(&report);
    Json(report)
}

/// Release all artifact content and empty the store.
pub async fn release_artifacts(State(state): State<Arc<AppState>>) -> StatusCode {
    state.queue().artifacts().release_all().await;
    StatusCode::NO_CONTENT
}

/// Attachment header carrying an ASCII `filename` plus the exact UTF-8 name
/// as RFC 5987 `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();

    if fallback == name {
        format!("attachment; filename=\"{}\"", name)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(name)
        )
    }
}

async fn find(state: &AppState, id: &str) -> Result<ConvertedArtifact, ApiError> {
    state
        .queue()
        .artifacts()
        .get(id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Artifact not found: {}", id)))
}
