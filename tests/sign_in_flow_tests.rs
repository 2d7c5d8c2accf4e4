// SPDX-License-Identifier: MIT

//! End-to-end sign-in flow against a local identity provider fixture.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Json, Router,
};
use crosspost_gateway::config::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

async fn fixture_sign_in(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["password"] == "correct-password" {
        (
            StatusCode::OK,
            Json(json!({
                "localId": "fixture-uid",
                "email": body["email"],
                "displayName": "Fixture User",
                "idToken": "fixture-id-token",
                "refreshToken": "fixture-refresh-token",
            })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "INVALID_PASSWORD" } })),
        )
    }
}

/// Spawn the identity fixture on an ephemeral port; returns its base URL.
async fn spawn_identity_fixture() -> String {
    let fixture = Router::new().route(
        "/identity/accounts:signInWithPassword",
        post(fixture_sign_in),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fixture listener");
    let addr = listener.local_addr().expect("Fixture has no local addr");

    tokio::spawn(async move {
        axum::serve(listener, fixture)
            .await
            .expect("Fixture server failed");
    });

    format!("http://{}/identity", addr)
}

fn sign_in_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn sign_in_mints_a_usable_session_token() {
    let mut config = Config::test_default();
    config.firebase_identity_url = spawn_identity_fixture().await;
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .clone()
        .oneshot(sign_in_request("user@example.com", "correct-password"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["uid"], "fixture-uid");
    assert_eq!(body["data"]["user"]["displayName"], "Fixture User");

    let token = body["data"]["tokens"]["token"]
        .as_str()
        .expect("Sign-in response carries a session token")
        .to_string();
    assert!(!token.is_empty());
    assert_eq!(body["data"]["tokens"]["expiresIn"], 3600);

    // The provider's raw tokens never appear in the response.
    let rendered = body.to_string();
    assert!(!rendered.contains("fixture-id-token"));
    assert!(!rendered.contains("fixture-refresh-token"));

    // The minted token opens the session-protected routes.
    let me = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["uid"], "fixture-uid");
}

#[tokio::test]
async fn sign_in_maps_provider_rejection_to_401() {
    let mut config = Config::test_default();
    config.firebase_identity_url = spawn_identity_fixture().await;
    let (app, _) = common::create_test_app_with_config(config);

    let response = app
        .oneshot(sign_in_request("user@example.com", "wrong-password"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 401);
    assert_eq!(
        body["error"]["message"],
        "FIREBASE_SIGN_IN_FAILED:INVALID_PASSWORD"
    );
}
