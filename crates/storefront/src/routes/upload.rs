//! Image upload proxy.
//!
//! Forwards images to the image host so its credentials never reach the
//! browser.

use axum::extract::{Multipart, State};
use serde::Deserialize;
use tracing::instrument;

use super::MessageResponse;
use crate::error::{AppError, Json, Query, Result};
use crate::middleware::RequireAuth;
use crate::services::MediaClient;
use crate::services::media::{MediaError, public_id_from_url};
use crate::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// Delete query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteQuery {
    pub url: Option<String>,
}

fn media(state: &AppState) -> Result<&MediaClient> {
    state
        .media()
        .ok_or_else(|| AppError::ServiceUnavailable("Image uploads are not configured".to_string()))
}

/// Upload an image.
///
/// POST /api/upload
#[instrument(skip(state, user, multipart), fields(user_id = %user.id))]
pub async fn upload(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let media = media(&state)?;

    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let filename = field.file_name().unwrap_or("upload").to_owned();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            file = Some((bytes, filename));
            break;
        }
    }

    let (bytes, filename) = file
        .filter(|(bytes, _)| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let result = media.upload(bytes.to_vec(), filename).await?;
    Ok(Json(result))
}

/// Delete an uploaded image by URL.
///
/// DELETE /api/upload?url=
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<MessageResponse>> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("Image URL is required".to_string()))?;

    let public_id = public_id_from_url(url).ok_or(MediaError::InvalidUrl)?;
    media(&state)?.destroy(public_id).await?;

    Ok(Json(MessageResponse::new("Deleted successfully")))
}
