// SPDX-License-Identifier: MIT

//! Social network request/response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wall-post request. `owner_id` negative means a community wall;
/// `attachments` is a single string or a sequence joined with commas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkPostRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub attachments: Option<Attachments>,
    #[serde(default)]
    pub from_group: Option<u8>,
    #[serde(default)]
    pub signed: Option<u8>,
}

/// Single attachment string or a sequence of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Attachments {
    One(String),
    Many(Vec<String>),
}

impl Attachments {
    pub fn joined(&self) -> String {
        match self {
            Attachments::One(s) => s.clone(),
            Attachments::Many(items) => items.join(","),
        }
    }
}

/// Admin-groups listing request (passthrough to `groups.get`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VkGroupsRequest {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub fields: Option<String>,
    #[serde(default)]
    pub extended: Option<u8>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub count: Option<u32>,
}

/// `photos.getWallUploadServer` result.
#[derive(Debug, Clone, Deserialize)]
pub struct VkUploadServer {
    pub upload_url: String,
}

/// What the upload server returns for a stored photo.
#[derive(Debug, Clone, Deserialize)]
pub struct VkUploadedPhoto {
    pub server: i64,
    pub photo: String,
    pub hash: String,
}

/// One record from `photos.saveWallPhoto`.
#[derive(Debug, Clone, Deserialize)]
pub struct VkSavedPhoto {
    pub id: i64,
    pub owner_id: i64,
}

/// The saved photo rendered as a wall attachment reference.
#[derive(Debug, Clone, Serialize)]
pub struct VkPhotoAttachment {
    pub id: i64,
    pub owner_id: i64,
    pub attachment: String,
}

/// The platform's response wrapper: exactly one of `response`/`error`.
#[derive(Debug, Clone, Deserialize)]
pub struct VkApiEnvelope {
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub error: Option<VkApiError>,
}

/// Platform error object with its numeric code.
#[derive(Debug, Clone, Deserialize)]
pub struct VkApiError {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: Option<String>,
}

/// Parse a string-or-number owner id.
pub fn parse_owner_id(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
