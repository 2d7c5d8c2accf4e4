// SPDX-License-Identifier: MIT

//! Identity routes: sign-in/up/refresh/reset/sign-out plus the
//! session-scoped `me` and profile update.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::auth::{AuthCredentials, AuthResponse, AuthUser, SessionClaims};
use crate::models::Envelope;
use crate::AppState;

/// Routes reachable without credentials.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/refresh", post(refresh))
        .route("/reset-password", post(reset_password))
        .route("/sign-out", post(sign_out))
}

/// Routes requiring a valid session token (middleware applied by the
/// router assembly).
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/me", get(me))
        .route("/profile", patch(update_profile))
}

#[derive(Deserialize)]
struct CredentialsBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl CredentialsBody {
    fn into_credentials(self) -> Result<AuthCredentials> {
        match (self.email, self.password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok(AuthCredentials { email, password })
            }
            _ => Err(AppError::BadRequest(
                "EMAIL_AND_PASSWORD_REQUIRED".to_string(),
            )),
        }
    }
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let credentials = body.into_credentials()?;
    let response = state.auth.sign_in(&credentials).await?;
    Ok(Json(Envelope::data(response)))
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<Envelope<AuthResponse>>)> {
    let credentials = body.into_credentials()?;
    let response = state.auth.sign_up(&credentials).await?;
    Ok((StatusCode::CREATED, Json(Envelope::data(response))))
}

#[derive(Deserialize)]
struct RefreshBody {
    #[serde(rename = "refreshToken", default)]
    refresh_token: Option<String>,
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let refresh_token = body
        .refresh_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("REFRESH_TOKEN_REQUIRED".to_string()))?;

    let response = state.auth.refresh(&refresh_token).await?;
    Ok(Json(Envelope::data(response)))
}

#[derive(Deserialize)]
struct ResetPasswordBody {
    #[serde(default)]
    email: Option<String>,
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<Envelope<()>>> {
    let email = body
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("EMAIL_REQUIRED".to_string()))?;

    state.auth.send_password_reset(&email).await?;
    Ok(Json(Envelope::ok()))
}

/// The internal token is held client-side only; sign-out just
/// acknowledges so the client can drop it.
async fn sign_out() -> Json<Envelope<()>> {
    Json(Envelope::ok())
}

#[derive(Serialize)]
struct MeResponse {
    user: AuthUser,
}

async fn me(Extension(claims): Extension<SessionClaims>) -> Json<Envelope<MeResponse>> {
    Json(Envelope::data(MeResponse { user: claims.user }))
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    Json(profile): Json<crate::models::auth::UpdateProfilePayload>,
) -> Result<Json<Envelope<AuthResponse>>> {
    let response = state.auth.update_profile(&claims, &profile).await?;
    Ok(Json(Envelope::data(response)))
}
