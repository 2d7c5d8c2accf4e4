// SPDX-License-Identifier: MIT

use crosspost_gateway::config::Config;
use crosspost_gateway::db::mongo::MongoDb;
use crosspost_gateway::models::auth::{AuthUser, TokenPair};
use crosspost_gateway::routes::create_router;
use crosspost_gateway::services::SessionCodec;
use crosspost_gateway::AppState;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for tests; short timeout so unreachable endpoints fail fast.
#[allow(dead_code)]
pub fn test_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("Failed to build test HTTP client")
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = MongoDb::new_mock();
    let state = Arc::new(AppState::new(config, db, test_http_client()));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn test_user() -> AuthUser {
    AuthUser {
        uid: "user-1".to_string(),
        email: "user@example.com".to_string(),
        display_name: Some("Test User".to_string()),
        photo_url: None,
    }
}

/// Mint a session token the way the auth service does, so protected
/// routes can be exercised without an identity provider.
#[allow(dead_code)]
pub fn mint_session_token(config: &Config) -> String {
    let codec = SessionCodec::new(&config.jwt_secret, config.jwt_ttl_seconds);
    let pair = TokenPair {
        id_token: "provider-id-token".to_string(),
        refresh_token: "provider-refresh-token".to_string(),
    };
    codec
        .mint(&test_user(), &pair)
        .expect("Failed to mint session token")
        .token
}
