//! Format catalog API handlers.

use axum::{
    extract::{Path, Query},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use fileshift_core::formats::{
    extension_of, formats_by_category, info_for, is_known_format, popular_targets, preset,
    presets, quality_options, search_formats, targets_for, ConversionPreset, FormatCategory,
    FormatEntry, FormatInfo, QualityOption,
};

use super::error::ApiError;

/// Query parameters for format search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Details for a single extension
#[derive(Debug, Serialize)]
pub struct FormatDetailsResponse {
    pub extension: String,
    pub known: bool,
    #[serde(flatten)]
    pub info: FormatInfo,
    pub available_targets: Vec<&'static str>,
    pub popular_targets: Vec<&'static str>,
    /// Selectable output quality levels when converting into this format
    pub quality_options: &'static [QualityOption],
}

/// List every catalog format grouped by category
pub async fn list_formats() -> Json<BTreeMap<FormatCategory, Vec<FormatEntry>>> {
    Json(formats_by_category())
}

/// Search formats by extension, name or description
pub async fn search(Query(params): Query<SearchParams>) -> Result<Json<Vec<FormatEntry>>, ApiError> {
    let query = params.q.unwrap_or_default();
    let query = query.trim();
    if query.is_empty() {
        return Err(ApiError::bad_request("Query parameter 'q' is required"));
    }
    Ok(Json(search_formats(query)))
}

/// Describe one extension and where it can be converted to
///
/// Accepts a bare extension (`jpg`) or a file name (`photo.JPG`).
pub async fn get_format(Path(ext): Path<String>) -> Json<FormatDetailsResponse> {
    let extension = if ext.contains('.') {
        extension_of(&ext)
    } else {
        ext.to_lowercase()
    };

    Json(FormatDetailsResponse {
        known: is_known_format(&extension),
        info: info_for(&extension),
        available_targets: targets_for(&extension).to_vec(),
        popular_targets: popular_targets(&extension),
        quality_options: quality_options(&extension),
        extension,
    })
}

/// List conversion presets
pub async fn list_presets() -> Json<&'static [ConversionPreset]> {
    Json(presets())
}

pub async fn get_preset(
    Path(key): Path<String>,
) -> Result<Json<&'static ConversionPreset>, ApiError> {
    preset(&key)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Preset not found: {}", key)))
}
