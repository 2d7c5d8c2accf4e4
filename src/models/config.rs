// SPDX-License-Identifier: MIT

//! Stored user configuration shapes.
//!
//! The server never decrypts `encrypted_data`; ciphertext, iv and salt are
//! produced and consumed only by the client.

use serde::{Deserialize, Serialize};

/// What the client sends and receives. `version`/`updated_at` are stamped
/// server-side on save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfigPayload {
    pub encrypted_data: String,
    pub iv: String,
    pub salt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One document per user, keyed by `user_id` (unique index).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfigDocument {
    pub user_id: String,
    pub encrypted_data: String,
    pub iv: String,
    pub salt: String,
    pub version: String,
    pub updated_at: String,
}

impl StoredConfigDocument {
    /// Strip the key field for the response body.
    pub fn into_payload(self) -> StoredConfigPayload {
        StoredConfigPayload {
            encrypted_data: self.encrypted_data,
            iv: self.iv,
            salt: self.salt,
            version: Some(self.version),
            updated_at: Some(self.updated_at),
        }
    }
}
