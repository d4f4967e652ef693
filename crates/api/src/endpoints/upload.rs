//! File upload endpoint.

use axum::{
    Router,
    extract::{Multipart, State},
    routing::post,
};
use cidadao_common::{AppError, AppResult};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub key: String,
    pub size: u64,
    pub content_type: String,
}

/// Upload a photo via multipart form (field `file`).
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await?;

        let uploaded = state
            .upload_service
            .upload(&file_name, content_type.as_deref(), &data)
            .await?;

        tracing::debug!(user_id = user.id, url = %uploaded.url, "Upload accepted");

        return Ok(ApiResponse::ok(UploadResponse {
            url: uploaded.url,
            key: uploaded.key,
            size: uploaded.size,
            content_type: uploaded.content_type,
        }));
    }

    Err(AppError::BadRequest("No file provided".to_string()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}
