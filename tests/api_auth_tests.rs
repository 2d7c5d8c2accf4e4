// SPDX-License-Identifier: MIT

//! Route protection tests.
//!
//! Verifies the three protection tiers over the assembled router:
//! public routes answer without credentials, session routes demand a
//! valid bearer token, and the platform adapters follow the configured
//! auth mode (bearer or shared api key).

mod common;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
};
use crosspost_gateway::config::{AuthMode, Config};
use serde_json::Value;
use std::net::SocketAddr;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_public_and_enveloped() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "OK");
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn sign_out_is_public() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/auth/sign-out", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn sign_in_requires_credentials() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/auth/sign-in", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], "EMAIL_AND_PASSWORD_REQUIRED");
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn refresh_requires_token() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/auth/refresh", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "REFRESH_TOKEN_REQUIRED");
}

#[tokio::test]
async fn me_requires_authorization_header() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/api/auth/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["message"], "Authorization header missing");
}

#[tokio::test]
async fn me_rejects_malformed_header() {
    let (app, _) = common::create_test_app();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "Invalid authorization header format"
    );
}

#[tokio::test]
async fn me_rejects_garbage_token() {
    let (app, _) = common::create_test_app();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer not-a-real-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn me_returns_user_from_session_claims() {
    let (app, state) = common::create_test_app();
    let token = common::mint_session_token(&state.config);

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["uid"], "user-1");
    assert_eq!(body["data"]["user"]["email"], "user@example.com");
}

#[tokio::test]
async fn config_routes_require_session() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn telegram_gate_requires_bearer_token_in_bearer_mode() {
    let (app, _) = common::create_test_app();

    let response = app
        .oneshot(post_json("/api/telegram/sendMessage", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn telegram_validation_runs_after_the_gate() {
    let (app, state) = common::create_test_app();
    let token = common::mint_session_token(&state.config);

    let request = Request::builder()
        .method("POST")
        .uri("/api/telegram/sendMessage")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "chat_id is required");
}

fn api_key_config() -> Config {
    let mut config = Config::test_default();
    config.auth_mode = AuthMode::ApiKey;
    config.api_key = Some("sekret".to_string());
    config
}

#[tokio::test]
async fn api_key_mode_rejects_missing_and_wrong_keys() {
    let (app, _) = common::create_test_app_with_config(api_key_config());

    let response = app
        .clone()
        .oneshot(post_json("/api/telegram/sendMessage", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/telegram/sendMessage")
        .header("x-api-key", "wrong")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_key_mode_accepts_the_configured_key() {
    let (app, _) = common::create_test_app_with_config(api_key_config());

    let request = Request::builder()
        .method("POST")
        .uri("/api/telegram/sendMessage")
        .header("x-api-key", "sekret")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    // Past the gate; fails on body validation, not auth.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn api_key_mode_does_not_loosen_session_routes() {
    let (app, _) = common::create_test_app_with_config(api_key_config());

    let request = Request::builder()
        .uri("/api/auth/me")
        .header("x-api-key", "sekret")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rate_limit_kicks_in_after_the_window_budget() {
    // Behind a declared trusted proxy the limiter keys on the forwarded
    // address; exhaust one IP's budget.
    let mut config = Config::test_default();
    config.trust_proxy = true;
    let (app, _) = common::create_test_app_with_config(config);

    for _ in 0..100 {
        let request = Request::builder()
            .uri("/api/health")
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let request = Request::builder()
        .uri("/api/health")
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"]["message"],
        "Too many requests from this IP, please try again later."
    );

    // Other addresses are unaffected.
    let request = Request::builder()
        .uri("/api/health")
        .header("x-forwarded-for", "203.0.113.10")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn forged_forwarded_headers_cannot_evade_the_rate_limit() {
    // Without a trusted proxy the limiter keys on the socket peer, so a
    // direct caller rotating x-forwarded-for values burns one budget.
    let (app, _) = common::create_test_app();
    let peer: SocketAddr = "192.0.2.77:50000".parse().unwrap();

    for n in 0..100u32 {
        let mut request = Request::builder()
            .uri("/api/health")
            .header("x-forwarded-for", format!("198.51.100.{}", n % 250))
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let mut request = Request::builder()
        .uri("/api/health")
        .header("x-forwarded-for", "198.51.100.251")
        .body(Body::empty())
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn security_headers_are_present_on_responses() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
}
