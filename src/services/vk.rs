// SPDX-License-Identifier: MIT

//! Social network client: wall posting, the three-step photo upload
//! pipeline, and admin-group listing.
//!
//! The platform reports errors as numeric codes in a JSON error object;
//! `map_platform_error` translates them to HTTP statuses.

use crate::error::{AppError, Result};
use crate::models::vk::{
    parse_owner_id, VkApiEnvelope, VkApiError, VkGroupsRequest, VkPhotoAttachment, VkPostRequest,
    VkSavedPhoto, VkUploadServer, VkUploadedPhoto,
};
use serde_json::Value;

/// Map a platform error object to `{HTTP status, message}`.
///
/// Permission-class codes map to 403, throttling to 429, auth to 401; a
/// code that already is a plausible HTTP status passes through; anything
/// else becomes 500. Codes 15 and 214 get friendlier messages.
pub fn map_platform_error(error: &VkApiError) -> AppError {
    let code = error.error_code;

    let status: u16 = match code {
        15 | 214 | 219 | 220 | 221 | 222 => 403,
        6 | 9 => 429,
        5 | 17 => 401,
        c if (400..=599).contains(&c) => c as u16,
        _ => 500,
    };

    let message = match code {
        15 => "VK API access denied. Ensure the token has permissions wall, photos, groups and that the user can post to this wall.".to_string(),
        214 => "VK API rejected the request: posting to this wall is restricted or comments are disabled.".to_string(),
        _ => error
            .error_msg
            .clone()
            .unwrap_or_else(|| "VK API error".to_string()),
    };

    AppError::Platform { code: status, message }
}

/// Build the form-urlencoded wall-post payload.
///
/// `from_group` defaults to 1 on community walls (negative owner) and 0
/// otherwise; `signed` and `message`/`attachments` are appended only when
/// provided.
pub fn build_post_form(request: &VkPostRequest, api_version: &str) -> Result<Vec<(String, String)>> {
    let access_token = request
        .access_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("VK access token is required".to_string()))?;

    let owner_id = request
        .owner_id
        .as_ref()
        .and_then(parse_owner_id)
        .ok_or_else(|| AppError::BadRequest("owner_id must be a number".to_string()))?;

    let from_group = request
        .from_group
        .unwrap_or(if owner_id < 0 { 1 } else { 0 });

    let mut form = vec![
        ("owner_id".to_string(), owner_id.to_string()),
        ("from_group".to_string(), from_group.to_string()),
        ("v".to_string(), api_version.to_string()),
        ("access_token".to_string(), access_token.to_string()),
    ];

    if let Some(message) = request.message.as_deref().filter(|m| !m.is_empty()) {
        form.push(("message".to_string(), message.to_string()));
    }

    if let Some(attachments) = &request.attachments {
        let joined = attachments.joined();
        if !joined.is_empty() {
            form.push(("attachments".to_string(), joined));
        }
    }

    if let Some(signed) = request.signed {
        form.push(("signed".to_string(), signed.to_string()));
    }

    Ok(form)
}

/// Social network API client.
#[derive(Clone)]
pub struct VkClient {
    http: reqwest::Client,
    api_url: String,
    api_version: String,
}

impl VkClient {
    pub fn new(http: reqwest::Client, api_base: &str, api_version: &str) -> Self {
        Self {
            http,
            api_url: api_base.to_string(),
            api_version: api_version.to_string(),
        }
    }

    /// Create a wall post; returns the platform's `response` object.
    pub async fn create_post(&self, request: &VkPostRequest) -> Result<Value> {
        let form = build_post_form(request, &self.api_version)?;

        let response = self
            .http
            .post(format!("{}/wall.post", self.api_url))
            .form(&form)
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from VK API".to_string()))?;

        self.unwrap_envelope(response).await
    }

    /// Upload a photo for wall attachment: get-upload-server → upload the
    /// bytes as multipart → save. Each step short-circuits on a platform
    /// error object.
    pub async fn upload_photo(
        &self,
        access_token: &str,
        owner_id: i64,
        bytes: Vec<u8>,
        filename: String,
        content_type: String,
    ) -> Result<VkPhotoAttachment> {
        let access_token = access_token.trim();
        if access_token.is_empty() {
            return Err(AppError::Unauthorized(
                "VK access token is required".to_string(),
            ));
        }

        // Negative owner means a community wall; the upload endpoints
        // take the absolute group id instead.
        let owner_scope: (&str, String) = if owner_id < 0 {
            ("group_id", owner_id.unsigned_abs().to_string())
        } else {
            ("user_id", owner_id.to_string())
        };

        // Step 1: upload server URL
        let response = self
            .http
            .get(format!("{}/photos.getWallUploadServer", self.api_url))
            .query(&[
                ("v", self.api_version.as_str()),
                ("access_token", access_token),
                (owner_scope.0, owner_scope.1.as_str()),
            ])
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from VK API".to_string()))?;

        let server: VkUploadServer = self.parse_response(response).await?;

        // Step 2: multipart upload of the raw bytes
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(&content_type)
            .map_err(|e| AppError::BadRequest(format!("Invalid content type: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("photo", part);

        let upload_response = self
            .http
            .post(&server.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from VK upload server".to_string()))?;

        let uploaded: VkUploadedPhoto =
            upload_response.json().await.map_err(|_| AppError::Platform {
                code: 500,
                message: "VK API error".to_string(),
            })?;

        // Step 3: save the uploaded photo
        let mut save_form = vec![
            ("photo".to_string(), uploaded.photo),
            ("server".to_string(), uploaded.server.to_string()),
            ("hash".to_string(), uploaded.hash),
            ("v".to_string(), self.api_version.clone()),
            ("access_token".to_string(), access_token.to_string()),
        ];
        save_form.push((owner_scope.0.to_string(), owner_scope.1));

        let save_response = self
            .http
            .post(format!("{}/photos.saveWallPhoto", self.api_url))
            .form(&save_form)
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from VK API".to_string()))?;

        let saved: Vec<VkSavedPhoto> = self.parse_response(save_response).await?;

        let photo = saved.into_iter().next().ok_or_else(|| AppError::Platform {
            code: 500,
            message: "Failed to save photo in VK".to_string(),
        })?;

        Ok(VkPhotoAttachment {
            id: photo.id,
            owner_id: photo.owner_id,
            attachment: format!("photo{}_{}", photo.owner_id, photo.id),
        })
    }

    /// List groups the token's user administers (passthrough).
    pub async fn get_admin_groups(&self, request: &VkGroupsRequest) -> Result<Value> {
        let access_token = request
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized("VK access token is required".to_string()))?;

        let mut query = vec![
            ("v".to_string(), self.api_version.clone()),
            ("access_token".to_string(), access_token.to_string()),
            (
                "filter".to_string(),
                request.filter.clone().unwrap_or_else(|| "admin".to_string()),
            ),
        ];
        if let Some(fields) = &request.fields {
            query.push(("fields".to_string(), fields.clone()));
        }
        if let Some(extended) = request.extended {
            query.push(("extended".to_string(), extended.to_string()));
        }
        if let Some(offset) = request.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(count) = request.count {
            query.push(("count".to_string(), count.to_string()));
        }

        let response = self
            .http
            .get(format!("{}/groups.get", self.api_url))
            .query(&query)
            .send()
            .await
            .map_err(|_| AppError::Transport("No response from VK API".to_string()))?;

        self.unwrap_envelope(response).await
    }

    /// Parse a platform envelope, short-circuiting on its error object.
    async fn unwrap_envelope(&self, response: reqwest::Response) -> Result<Value> {
        let envelope: VkApiEnvelope = response.json().await.map_err(|_| AppError::Platform {
            code: 500,
            message: "VK API error".to_string(),
        })?;

        if let Some(error) = &envelope.error {
            return Err(map_platform_error(error));
        }

        Ok(envelope.response.unwrap_or(Value::Null))
    }

    /// Like `unwrap_envelope`, but deserializes the `response` payload.
    async fn parse_response<T: for<'de> serde::Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let value = self.unwrap_envelope(response).await?;
        serde_json::from_value(value).map_err(|_| AppError::Platform {
            code: 500,
            message: "VK API error".to_string(),
        })
    }
}
