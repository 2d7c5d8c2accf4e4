// SPDX-License-Identifier: MIT

//! Application error types with the uniform API envelope.
//!
//! Every error converts to `{ success: false, error: { code, message } }`
//! where `code` is always a valid HTTP status. Adapters never swallow
//! remote errors; the boundary (this `IntoResponse` impl) is the only
//! place errors become HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Identity-provider operation tag.
///
/// Determines the HTTP status of a failed provider call; the wire
/// message renders as `<TAG>:<provider message>` so clients can still
/// discriminate on the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderOp {
    SignIn,
    SignUp,
    ResetPassword,
    UpdateProfile,
    Refresh,
    Lookup,
}

impl ProviderOp {
    /// Wire tag prepended to the provider's own message.
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderOp::SignIn => "FIREBASE_SIGN_IN_FAILED",
            ProviderOp::SignUp => "FIREBASE_SIGN_UP_FAILED",
            ProviderOp::ResetPassword => "FIREBASE_RESET_PASSWORD_FAILED",
            ProviderOp::UpdateProfile => "FIREBASE_UPDATE_PROFILE_FAILED",
            ProviderOp::Refresh => "FIREBASE_REFRESH_FAILED",
            ProviderOp::Lookup => "FIREBASE_LOOKUP_FAILED",
        }
    }

    /// HTTP status for a failed call, matching the per-endpoint statuses
    /// of the upstream API contract.
    pub fn status(&self) -> StatusCode {
        match self {
            ProviderOp::SignIn | ProviderOp::Refresh | ProviderOp::Lookup => {
                StatusCode::UNAUTHORIZED
            }
            ProviderOp::SignUp | ProviderOp::ResetPassword | ProviderOp::UpdateProfile => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Application error type that converts to envelope responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Sealed payload rejected: {0}")]
    Decryption(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("{}:{message}", op.tag())]
    Provider { op: ProviderOp, message: String },

    /// Remote platform rejected the call; `code` is already an HTTP status
    /// (derived from the platform's own error code where applicable).
    #[error("Platform error {code}: {message}")]
    Platform { code: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the identity provider signaled an expired id token.
    ///
    /// Best-effort heuristic: matches the provider's documented
    /// `TOKEN_EXPIRED` reason string inside the error message.
    pub fn is_token_expired(&self) -> bool {
        matches!(self, AppError::Provider { message, .. } if message.contains("TOKEN_EXPIRED"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AppError::Decryption(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Provider { op, message } => {
                (op.status(), format!("{}:{}", op.tag(), message))
            }
            AppError::Platform { code, message } => (
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message.clone(),
            ),
            AppError::Transport(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests from this IP, please try again later.".to_string(),
            ),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: status.as_u16(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_op_statuses() {
        assert_eq!(ProviderOp::SignIn.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProviderOp::Refresh.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProviderOp::SignUp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProviderOp::UpdateProfile.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn token_expired_detection() {
        let err = AppError::Provider {
            op: ProviderOp::UpdateProfile,
            message: "TOKEN_EXPIRED".to_string(),
        };
        assert!(err.is_token_expired());

        let err = AppError::Provider {
            op: ProviderOp::UpdateProfile,
            message: "INVALID_ID_TOKEN".to_string(),
        };
        assert!(!err.is_token_expired());
    }
}
