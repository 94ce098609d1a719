//! Queue file API handlers.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use fileshift_core::formats::format_file_size;
use fileshift_core::queue::RejectedFile;
use fileshift_core::{FormatCategory, QueuedFile, SubmittedFile};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Response types
// ============================================================================

/// A queued file as shown to clients
#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub size_display: String,
    pub extension: String,
    pub category: FormatCategory,
    pub format_name: String,
    /// Lifecycle state ("pending", "converting", "completed", "failed").
    pub state: &'static str,
    pub progress: f32,
    pub error: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl From<QueuedFile> for FileResponse {
    fn from(file: QueuedFile) -> Self {
        Self {
            progress: file.progress(),
            error: file.error().map(str::to_string),
            size_display: format_file_size(file.size),
            category: file.format.category,
            format_name: file.format.name,
            id: file.id,
            name: file.name,
            size: file.size,
            extension: file.extension,
            state: file.status.name(),
            added_at: file.added_at,
        }
    }
}

/// A file that failed intake validation
#[derive(Debug, Serialize)]
pub struct RejectedFileResponse {
    pub name: String,
    pub size: u64,
    pub errors: Vec<String>,
}

impl From<RejectedFile> for RejectedFileResponse {
    fn from(rejected: RejectedFile) -> Self {
        Self {
            name: rejected.name,
            size: rejected.size,
            errors: rejected.errors.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub accepted: Vec<FileResponse>,
    pub rejected: Vec<RejectedFileResponse>,
}

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub files: Vec<FileResponse>,
    pub total: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Upload files as multipart form data.
///
/// Every part with a file name is submitted; other parts are ignored.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut submitted = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(ApiError::bad_request(format!(
                    "Invalid multipart body: {}",
                    e
                )))
            }
        };

        let Some(name) = field.file_name().map(str::to_string) else {
            debug!(field = ?field.name(), "Skipping multipart field without file name");
            continue;
        };

        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file {}: {}", name, e)))?;
        submitted.push(SubmittedFile::new(name, content));
    }

    if submitted.is_empty() {
        return Err(ApiError::bad_request("No files in request"));
    }

    let outcome = state.queue().enqueue(submitted).await;
    info!(
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected.len(),
        "Processed upload"
    );

    if !outcome.accepted.is_empty() {
        state.ws_broadcaster().files_added(outcome.accepted.len());
    }

    let status = if outcome.accepted.is_empty() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(UploadResponse {
            accepted: outcome.accepted.into_iter().map(FileResponse::from).collect(),
            rejected: outcome
                .rejected
                .into_iter()
                .map(RejectedFileResponse::from)
                .collect(),
        }),
    ))
}

/// List queued files in enqueue order
pub async fn list_files(State(state): State<Arc<AppState>>) -> Json<ListFilesResponse> {
    let files: Vec<FileResponse> = state
        .queue()
        .files()
        .await
        .into_iter()
        .map(FileResponse::from)
        .collect();

    Json(ListFilesResponse {
        total: files.len(),
        files,
    })
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    state
        .queue()
        .file(&id)
        .await
        .map(|file| Json(file.into()))
        .ok_or_else(|| ApiError::not_found(format!("File not found: {}", id)))
}

/// Remove one file. Fails with 409 while the file is converting.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FileResponse>, ApiError> {
    let removed = state.queue().remove(&id).await?;
    state.ws_broadcaster().file_removed(&removed.id);
    Ok(Json(removed.into()))
}

/// Remove every file and abandon the active run, if any.
pub async fn clear_files(State(state): State<Arc<AppState>>) -> StatusCode {
    state.queue().clear().await;
    state.ws_broadcaster().queue_cleared();
    StatusCode::NO_CONTENT
}
