// SPDX-License-Identifier: MIT

//! Social network routes: wall posting, photo upload, admin groups.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::vk::{parse_owner_id, VkGroupsRequest, VkPhotoAttachment, VkPostRequest};
use crate::models::Envelope;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/post", post(create_post))
        .route("/uploadPhoto", post(upload_photo))
        .route("/groups", post(get_groups))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VkPostRequest>,
) -> Result<Json<Envelope<Value>>> {
    let result = state.vk.create_post(&body).await?;
    Ok(Json(Envelope::data(result)))
}

struct PhotoUpload {
    bytes: Vec<u8>,
    filename: String,
    content_type: String,
}

async fn upload_photo(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<VkPhotoAttachment>>> {
    let mut access_token = None;
    let mut owner_id = None;
    let mut photo = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let filename = field.file_name().unwrap_or("photo.jpg").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                photo = Some(PhotoUpload {
                    bytes: bytes.to_vec(),
                    filename,
                    content_type,
                });
            }
            "access_token" => {
                access_token = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "owner_id" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                owner_id = parse_owner_id(&Value::String(raw));
            }
            _ => {}
        }
    }

    let photo = photo.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let access_token = access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("VK access token is required".to_string()))?;
    let owner_id =
        owner_id.ok_or_else(|| AppError::BadRequest("owner_id must be a number".to_string()))?;

    let attachment = state
        .vk
        .upload_photo(
            &access_token,
            owner_id,
            photo.bytes,
            photo.filename,
            photo.content_type,
        )
        .await?;

    Ok(Json(Envelope::data(attachment)))
}

async fn get_groups(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VkGroupsRequest>,
) -> Result<Json<Envelope<Value>>> {
    let result = state.vk.get_admin_groups(&body).await?;
    Ok(Json(Envelope::data(result)))
}
