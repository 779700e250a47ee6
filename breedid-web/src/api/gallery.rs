//! Gallery listing endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    /// Defaults to the configured display limit
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    /// File names, newest first; fetch each under `/gallery/<name>`
    pub images: Vec<String>,
}

/// GET /api/gallery
pub async fn get_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> ApiResult<Json<GalleryResponse>> {
    let limit = query
        .limit
        .unwrap_or(state.config.gallery.display_limit);
    let images = state.gallery.recent(limit)?;
    Ok(Json(GalleryResponse { images }))
}
