// SPDX-License-Identifier: MIT

//! Messaging platform request/response shapes.
//!
//! `chat_id` is string-or-number on the wire, so it is carried as a raw
//! JSON value and stringified only when a form body requires it. Optional
//! flags are tri-state: absent fields are never default-injected into the
//! outbound request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `sendMessage` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: Value,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_web_page_preview: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sending_without_reply: Option<bool>,
}

/// `sendPhoto` request when the photo is a URL or platform file id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPhotoRequest {
    pub chat_id: Value,
    pub photo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
}

/// One entry of a media group. `media` is either a reference (URL/file id)
/// or an `attach://<field>` pointer at a binary part of the same request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_spoiler: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_content_type_detection: Option<bool>,
}

/// `sendMediaGroup` request body (two to ten ordered items).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMediaGroupRequest {
    pub chat_id: Value,
    pub media: Vec<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sending_without_reply: Option<bool>,
}

/// The platform's response wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Render a string-or-number chat id for form fields.
pub fn chat_id_to_string(chat_id: &Value) -> Option<String> {
    match chat_id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_id_accepts_string_and_number() {
        assert_eq!(chat_id_to_string(&json!("@channel")).as_deref(), Some("@channel"));
        assert_eq!(chat_id_to_string(&json!(-1001234)).as_deref(), Some("-1001234"));
        assert_eq!(chat_id_to_string(&json!("")), None);
        assert_eq!(chat_id_to_string(&json!(null)), None);
    }

    #[test]
    fn optional_flags_are_omitted_when_absent() {
        let req = SendMessageRequest {
            chat_id: json!(42),
            text: "hi".to_string(),
            parse_mode: None,
            disable_web_page_preview: None,
            disable_notification: None,
            reply_to_message_id: None,
            allow_sending_without_reply: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("disable_notification").is_none());
        assert!(value.get("reply_to_message_id").is_none());
    }
}
