// SPDX-License-Identifier: MIT

//! Router assembly.
//!
//! Three protection tiers: public (health, identity entry points),
//! session (user-scoped routes, always bearer), and gated (platform
//! adapters, bearer or api-key per deployment mode).

pub mod auth;
pub mod config;
pub mod telegram;
pub mod vk;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::HeaderValue,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::{require_gate, require_session};
use crate::middleware::rate_limit::rate_limit;
use crate::middleware::security::add_security_headers;
use crate::models::Envelope;
use crate::AppState;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Create the application router with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.config.cors_origin);

    let auth_routes = auth::public_routes().merge(
        auth::session_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), require_session)),
    );

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest(
            "/api/config",
            config::routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_session)),
        )
        .nest(
            "/api/telegram",
            telegram::routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_gate)),
        )
        .nest(
            "/api/vk",
            vk::routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), require_gate)),
        )
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors)
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors(origin: &str) -> CorsLayer {
    if origin == "*" {
        return CorsLayer::permissive();
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS origin, falling back to permissive");
            CorsLayer::permissive()
        }
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
    uptime: f64,
}

/// Health check endpoint (public, enveloped like everything else).
async fn health_check(State(state): State<Arc<AppState>>) -> Json<Envelope<HealthStatus>> {
    Json(Envelope::data(HealthStatus {
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    }))
}
