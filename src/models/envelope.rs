// SPDX-License-Identifier: MIT

//! The uniform `{ success, data | error }` response wrapper.
//!
//! Error envelopes are produced by `AppError::into_response`; this type
//! covers the success side.

use serde::Serialize;

/// Successful response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Envelope carrying a payload.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    /// Bare `{ "success": true }` envelope.
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_shape() {
        let value = serde_json::to_value(Envelope::data(serde_json::json!({"x": 1}))).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["x"], 1);
    }

    #[test]
    fn bare_envelope_omits_data() {
        let value = serde_json::to_value(Envelope::ok()).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("data").is_none());
    }
}
