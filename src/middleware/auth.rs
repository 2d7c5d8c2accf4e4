// SPDX-License-Identifier: MIT

//! Authentication middleware.
//!
//! `require_session` gates user-scoped routes on a valid internal session
//! token. `require_gate` protects the platform adapters and follows the
//! deployment's auth mode: bearer session token, or a static shared
//! secret header. Exactly one mode is active per process.

use crate::config::AuthMode;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

const API_KEY_HEADER: &str = "x-api-key";

fn bearer_token(request: &Request) -> Result<String, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization header missing".to_string()))?;

    match header_value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AppError::Unauthorized(
            "Invalid authorization header format".to_string(),
        )),
    }
}

/// Verify the bearer session token and stash its claims in extensions.
fn authenticate_session(state: &AppState, request: &mut Request) -> Result<(), AppError> {
    let token = bearer_token(request)?;
    let claims = state.auth.verify_token(&token)?;
    request.extensions_mut().insert(claims);
    Ok(())
}

/// Middleware requiring a valid internal session token.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authenticate_session(&state, &mut request)?;
    Ok(next.run(request).await)
}

/// Middleware gating the platform adapters per the deployment auth mode.
pub async fn require_gate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match state.config.auth_mode {
        AuthMode::Bearer => authenticate_session(&state, &mut request)?,
        AuthMode::ApiKey => {
            let expected = state
                .config
                .api_key
                .as_deref()
                .ok_or_else(|| AppError::Unauthorized("API key is not configured".to_string()))?;

            let provided = request
                .headers()
                .get(API_KEY_HEADER)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| AppError::Unauthorized("API key header missing".to_string()))?;

            if provided.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() != 1 {
                return Err(AppError::Unauthorized("Invalid API key".to_string()));
            }
        }
    }

    Ok(next.run(request).await)
}
