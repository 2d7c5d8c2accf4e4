// SPDX-License-Identifier: MIT

//! Encrypted user-config routes (bearer session required).

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::auth::SessionClaims;
use crate::models::config::StoredConfigPayload;
use crate::models::Envelope;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_config).post(save_config).delete(delete_config))
        .route("/exists", get(has_config))
}

async fn get_config(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<Envelope<StoredConfigPayload>>> {
    let config = state
        .db
        .get_config(&claims.user.uid)
        .await?
        .ok_or_else(|| AppError::NotFound("CONFIG_NOT_FOUND".to_string()))?;

    Ok(Json(Envelope::data(config)))
}

#[derive(Deserialize)]
struct SaveConfigBody {
    #[serde(rename = "encryptedData", default)]
    encrypted_data: Option<String>,
    #[serde(default)]
    iv: Option<String>,
    #[serde(default)]
    salt: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

async fn save_config(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
    Json(body): Json<SaveConfigBody>,
) -> Result<StatusCode> {
    let required = |value: Option<String>, field: &str| -> Result<String> {
        value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("{} is required", field)))
    };

    let payload = StoredConfigPayload {
        encrypted_data: required(body.encrypted_data, "encryptedData")?,
        iv: required(body.iv, "iv")?,
        salt: required(body.salt, "salt")?,
        version: body.version,
        updated_at: None,
    };

    state.db.save_config(&claims.user.uid, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_config(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<StatusCode> {
    state.db.delete_config(&claims.user.uid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Serialize)]
struct ExistsResponse {
    exists: bool,
}

async fn has_config(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<Envelope<ExistsResponse>>> {
    let exists = state.db.has_config(&claims.user.uid).await?;
    Ok(Json(Envelope::data(ExistsResponse { exists })))
}
