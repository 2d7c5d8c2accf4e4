// SPDX-License-Identifier: MIT

//! Messaging platform routes.
//!
//! `sendPhoto` and `sendMediaGroup` accept either a JSON body or a
//! multipart form carrying binary attachments; the handlers branch on the
//! request content type and hand off to the pure body builders.

use axum::{
    extract::{Multipart, Request, State},
    http::header,
    routing::post,
    Json, Router,
};
use axum::extract::FromRequest;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::telegram::{
    chat_id_to_string, MediaItem, SendMediaGroupRequest, SendMessageRequest,
};
use crate::models::Envelope;
use crate::services::telegram::{build_media_group_body, build_photo_body, PhotoInput, UploadedFile};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sendMessage", post(send_message))
        .route("/sendPhoto", post(send_photo))
        .route("/sendMediaGroup", post(send_media_group))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

#[derive(Deserialize)]
struct SendMessageBody {
    #[serde(default)]
    chat_id: Option<Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    parse_mode: Option<String>,
    #[serde(default)]
    disable_web_page_preview: Option<bool>,
    #[serde(default)]
    disable_notification: Option<bool>,
    #[serde(default)]
    reply_to_message_id: Option<i64>,
    #[serde(default)]
    allow_sending_without_reply: Option<bool>,
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<Envelope<Value>>> {
    let chat_id = required_chat_id(body.chat_id)?;
    let text = body
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("text is required".to_string()))?;

    let request = SendMessageRequest {
        chat_id,
        text,
        parse_mode: body.parse_mode,
        disable_web_page_preview: body.disable_web_page_preview,
        disable_notification: body.disable_notification,
        reply_to_message_id: body.reply_to_message_id,
        allow_sending_without_reply: body.allow_sending_without_reply,
    };

    let result = state.telegram.send_message(&request).await?;
    Ok(Json(Envelope::data(result)))
}

#[derive(Deserialize)]
struct SendPhotoBody {
    #[serde(default)]
    chat_id: Option<Value>,
    #[serde(default)]
    photo: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    parse_mode: Option<String>,
}

async fn send_photo(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Envelope<Value>>> {
    let (chat_id, photo, caption, parse_mode) = if is_multipart(&request) {
        read_photo_form(request).await?
    } else {
        let Json(body) = Json::<SendPhotoBody>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let photo = body
            .photo
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::BadRequest("photo is required".to_string()))?;
        (
            required_chat_id(body.chat_id)?,
            PhotoInput::Reference(photo),
            body.caption,
            body.parse_mode,
        )
    };

    let body = build_photo_body(&chat_id, photo, caption.as_deref(), parse_mode.as_deref())?;
    let result = state.telegram.send_photo(body).await?;
    Ok(Json(Envelope::data(result)))
}

async fn read_photo_form(
    request: Request,
) -> Result<(Value, PhotoInput, Option<String>, Option<String>)> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut chat_id = None;
    let mut photo = None;
    let mut caption = None;
    let mut parse_mode = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let filename = field
                    .file_name()
                    .unwrap_or("photo.jpg")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                photo = Some(PhotoInput::Upload {
                    bytes: bytes.to_vec(),
                    filename,
                    content_type,
                });
            }
            "chat_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                chat_id = Some(Value::String(value));
            }
            "caption" => {
                caption = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "parse_mode" => {
                parse_mode = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let chat_id = required_chat_id(chat_id)?;
    let photo =
        photo.ok_or_else(|| AppError::BadRequest("photo is required".to_string()))?;

    Ok((chat_id, photo, caption, parse_mode))
}

#[derive(Deserialize)]
struct SendMediaGroupBody {
    #[serde(default)]
    chat_id: Option<Value>,
    #[serde(default)]
    media: Option<Vec<Value>>,
    #[serde(default)]
    disable_notification: Option<bool>,
    #[serde(default)]
    reply_to_message_id: Option<i64>,
    #[serde(default)]
    allow_sending_without_reply: Option<bool>,
}

async fn send_media_group(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Envelope<Value>>> {
    let (group, files) = if is_multipart(&request) {
        read_media_group_form(request).await?
    } else {
        let Json(body) = Json::<SendMediaGroupBody>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let items = body
            .media
            .ok_or_else(|| AppError::BadRequest("media is required".to_string()))?;
        let media = decode_media_items(&items)?;

        let group = SendMediaGroupRequest {
            chat_id: required_chat_id(body.chat_id)?,
            media,
            disable_notification: body.disable_notification,
            reply_to_message_id: body.reply_to_message_id,
            allow_sending_without_reply: body.allow_sending_without_reply,
        };
        (group, Vec::new())
    };

    validate_media(&group.media)?;

    let body = build_media_group_body(&group, files)?;
    let result = state.telegram.send_media_group(body).await?;
    Ok(Json(Envelope::data(result)))
}

async fn read_media_group_form(
    request: Request,
) -> Result<(SendMediaGroupRequest, Vec<UploadedFile>)> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut chat_id = None;
    let mut media = None;
    let mut disable_notification = None;
    let mut reply_to_message_id = None;
    let mut allow_sending_without_reply = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        // Any part carrying a filename is a binary attachment referenced
        // from the media array as attach://<field name>.
        if field.file_name().is_some() {
            let filename = field.file_name().unwrap_or("file").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            files.push(UploadedFile {
                field_name: name,
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "chat_id" => chat_id = Some(Value::String(value)),
            "media" => media = Some(parse_media_field(&value)?),
            "disable_notification" => disable_notification = Some(value == "true"),
            "reply_to_message_id" => reply_to_message_id = value.parse().ok(),
            "allow_sending_without_reply" => {
                allow_sending_without_reply = Some(value == "true")
            }
            _ => {}
        }
    }

    let group = SendMediaGroupRequest {
        chat_id: required_chat_id(chat_id)?,
        media: media.ok_or_else(|| AppError::BadRequest("media is required".to_string()))?,
        disable_notification,
        reply_to_message_id,
        allow_sending_without_reply,
    };

    Ok((group, files))
}

/// Parse the `media` form field: a JSON array whose elements are media
/// item objects, or JSON strings each encoding one.
fn parse_media_field(raw: &str) -> Result<Vec<MediaItem>> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|_| AppError::BadRequest("media must be valid JSON".to_string()))?;

    let items = parsed
        .as_array()
        .ok_or_else(|| AppError::BadRequest("media must be an array".to_string()))?;

    decode_media_items(items)
}

fn decode_media_items(items: &[Value]) -> Result<Vec<MediaItem>> {
    items
        .iter()
        .map(|item| {
            let decoded = match item {
                Value::String(s) => serde_json::from_str(s),
                other => serde_json::from_value(other.clone()),
            };
            decoded.map_err(|_| {
                AppError::BadRequest("each media item must be a valid media object".to_string())
            })
        })
        .collect()
}

fn validate_media(media: &[MediaItem]) -> Result<()> {
    if media.len() < 2 {
        return Err(AppError::BadRequest(
            "media must contain at least 2 items".to_string(),
        ));
    }
    for item in media {
        if item.kind.is_empty() || item.media.is_empty() {
            return Err(AppError::BadRequest(
                "each media item requires type and media".to_string(),
            ));
        }
    }
    Ok(())
}

fn required_chat_id(chat_id: Option<Value>) -> Result<Value> {
    let chat_id = chat_id.unwrap_or(Value::Null);
    if chat_id_to_string(&chat_id).is_none() {
        return Err(AppError::BadRequest("chat_id is required".to_string()));
    }
    Ok(chat_id)
}
