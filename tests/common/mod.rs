// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use glimpse::{config::Config, db::Db, routes::create_router, services::TokenService, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app backed by an in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::default();
    let db = Db::connect("sqlite::memory:")
        .await
        .expect("in-memory database should open");
    let tokens = TokenService::new(&config.token_secret);

    let state = Arc::new(AppState { config, db, tokens });

    (create_router(state.clone()), state)
}

/// POST a JSON body and return the status plus parsed response body.
#[allow(dead_code)]
pub async fn post_json(app: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };

    (status, value)
}

/// Create an account through the API and return its id.
#[allow(dead_code)]
pub async fn create_account(app: &axum::Router, username: &str, password: &str) -> String {
    let (status, body) = post_json(
        app,
        "/api/createAccount",
        json!({
            "username": username,
            "password": password,
            "displayName": username,
            "email": format!("{}@example.com", username),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "createAccount failed: {}", body);
    body["id"].as_str().expect("id in response").to_string()
}

/// Sign in through the API and return (user id, token).
#[allow(dead_code)]
pub async fn sign_in(app: &axum::Router, username: &str, password: &str) -> (String, String) {
    let (status, body) = post_json(
        app,
        "/api/signIn",
        json!({ "username": username, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signIn failed: {}", body);
    (
        body["id"].as_str().expect("id in response").to_string(),
        body["token"].as_str().expect("token in response").to_string(),
    )
}
