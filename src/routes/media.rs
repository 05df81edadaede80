// SPDX-License-Identifier: MIT

//! Media ingestion and static serving, outside the dispatched API.

use crate::error::{AppError, Result};
use crate::models::{new_id, Media};
use crate::routes::api::IdResponse;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/media/{id}", get(get_media))
        .route("/api/upload", post(upload))
}

/// Serve a stored blob with its recorded MIME type.
async fn get_media(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Response> {
    let media = state
        .db
        .find_media_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("media {} does not exist", id)))?;

    Ok(([(header::CONTENT_TYPE, media.mime_type)], media.data).into_response())
}

/// Store an uploaded payload and return its id.
async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<IdResponse>> {
    if body.is_empty() {
        return Err(AppError::BadRequest("empty upload body".to_string()));
    }

    let mime_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let media = Media {
        id: new_id(),
        data: body.to_vec(),
        mime_type,
    };
    state.db.create_media(&media).await?;

    tracing::debug!(media_id = %media.id, bytes = media.data.len(), "Media stored");

    Ok(Json(IdResponse { id: media.id }))
}
