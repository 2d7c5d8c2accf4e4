// SPDX-License-Identifier: MIT

//! Messaging platform client.
//!
//! One structural branch point: when a photo or media attachment arrives
//! as raw bytes, the outbound body is multipart form data with the binary
//! attached as a file part; otherwise the body is plain JSON. Body
//! construction is kept pure (`OutboundBody`) so the branch is testable
//! without a network.

use crate::error::{AppError, Result};
use crate::models::telegram::{
    chat_id_to_string, SendMediaGroupRequest, SendMessageRequest, SendPhotoRequest,
    TelegramResponse,
};
use serde_json::Value;

/// A photo payload: reference (URL or platform file id) or raw upload.
#[derive(Debug, Clone)]
pub enum PhotoInput {
    Reference(String),
    Upload {
        bytes: Vec<u8>,
        filename: String,
        content_type: String,
    },
}

/// A binary attachment extracted from an inbound multipart request; its
/// field name is referenced from the media JSON as `attach://<name>`.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field_name: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One part of an outbound multipart body.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// The computed outbound request body.
#[derive(Debug, Clone)]
pub enum OutboundBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// Build the `sendPhoto` body: JSON for references, multipart for uploads.
pub fn build_photo_body(
    chat_id: &Value,
    photo: PhotoInput,
    caption: Option<&str>,
    parse_mode: Option<&str>,
) -> Result<OutboundBody> {
    let chat_id_str = chat_id_to_string(chat_id)
        .ok_or_else(|| AppError::BadRequest("chat_id is required".to_string()))?;

    match photo {
        PhotoInput::Reference(reference) => {
            let request = SendPhotoRequest {
                chat_id: chat_id.clone(),
                photo: reference,
                caption: caption.map(str::to_string),
                parse_mode: parse_mode.map(str::to_string),
            };
            let body = serde_json::to_value(&request)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize sendPhoto: {}", e)))?;
            Ok(OutboundBody::Json(body))
        }
        PhotoInput::Upload {
            bytes,
            filename,
            content_type,
        } => {
            let mut parts = vec![
                FormPart::Text {
                    name: "chat_id".to_string(),
                    value: chat_id_str,
                },
                FormPart::File {
                    name: "photo".to_string(),
                    filename,
                    content_type,
                    bytes,
                },
            ];
            if let Some(caption) = caption {
                parts.push(FormPart::Text {
                    name: "caption".to_string(),
                    value: caption.to_string(),
                });
            }
            if let Some(parse_mode) = parse_mode {
                parts.push(FormPart::Text {
                    name: "parse_mode".to_string(),
                    value: parse_mode.to_string(),
                });
            }
            Ok(OutboundBody::Multipart(parts))
        }
    }
}

/// Build the `sendMediaGroup` body. With binary attachments the `media`
/// array is JSON-encoded into a single form field and each file becomes a
/// named part; optional flags are appended only when the caller provided
/// them.
pub fn build_media_group_body(
    request: &SendMediaGroupRequest,
    files: Vec<UploadedFile>,
) -> Result<OutboundBody> {
    if files.is_empty() {
        let body = serde_json::to_value(request)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize sendMediaGroup: {}", e)))?;
        return Ok(OutboundBody::Json(body));
    }

    let chat_id_str = chat_id_to_string(&request.chat_id)
        .ok_or_else(|| AppError::BadRequest("chat_id is required".to_string()))?;

    let media_json = serde_json::to_string(&request.media)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize media array: {}", e)))?;

    let mut parts = vec![
        FormPart::Text {
            name: "chat_id".to_string(),
            value: chat_id_str,
        },
        FormPart::Text {
            name: "media".to_string(),
            value: media_json,
        },
    ];

    for file in files {
        parts.push(FormPart::File {
            name: file.field_name,
            filename: file.filename,
            content_type: file.content_type,
            bytes: file.bytes,
        });
    }

    if let Some(value) = request.disable_notification {
        parts.push(FormPart::Text {
            name: "disable_notification".to_string(),
            value: value.to_string(),
        });
    }
    if let Some(value) = request.reply_to_message_id {
        parts.push(FormPart::Text {
            name: "reply_to_message_id".to_string(),
            value: value.to_string(),
        });
    }
    if let Some(value) = request.allow_sending_without_reply {
        parts.push(FormPart::Text {
            name: "allow_sending_without_reply".to_string(),
            value: value.to_string(),
        });
    }

    Ok(OutboundBody::Multipart(parts))
}

/// Bot API client with the token baked into the base URL.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: String,
}

impl TelegramClient {
    /// `api_base` is the platform prefix ending in `/bot`; the bot token
    /// is appended per the platform's URL scheme.
    pub fn new(http: reqwest::Client, api_base: &str, bot_token: &str) -> Self {
        Self {
            http,
            api_url: format!("{}{}", api_base, bot_token),
        }
    }

    pub async fn send_message(&self, request: &SendMessageRequest) -> Result<Value> {
        let body = serde_json::to_value(request)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize sendMessage: {}", e)))?;
        self.call("sendMessage", OutboundBody::Json(body)).await
    }

    pub async fn send_photo(&self, body: OutboundBody) -> Result<Value> {
        self.call("sendPhoto", body).await
    }

    pub async fn send_media_group(&self, body: OutboundBody) -> Result<Value> {
        self.call("sendMediaGroup", body).await
    }

    async fn call(&self, method: &str, body: OutboundBody) -> Result<Value> {
        let url = format!("{}/{}", self.api_url, method);

        let request = match body {
            OutboundBody::Json(json) => self.http.post(&url).json(&json),
            OutboundBody::Multipart(parts) => {
                self.http.post(&url).multipart(to_multipart(parts)?)
            }
        };

        let response = request
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from Telegram API".to_string()))?;

        let parsed: TelegramResponse = response.json().await.map_err(|_| AppError::Platform {
            code: 500,
            message: "Telegram API error".to_string(),
        })?;

        if parsed.ok {
            return Ok(parsed.result.unwrap_or(Value::Null));
        }

        Err(AppError::Platform {
            code: parsed
                .error_code
                .and_then(|c| u16::try_from(c).ok())
                .filter(|c| (100..=599).contains(c))
                .unwrap_or(500),
            message: parsed
                .description
                .unwrap_or_else(|| "Telegram API error".to_string()),
        })
    }
}

fn to_multipart(parts: Vec<FormPart>) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                filename,
                content_type,
                bytes,
            } => {
                let file = reqwest::multipart::Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&content_type)
                    .map_err(|e| {
                        AppError::BadRequest(format!("Invalid content type: {}", e))
                    })?;
                form.part(name, file)
            }
        };
    }
    Ok(form)
}
