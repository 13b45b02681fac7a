// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, Response};
use fitboard::config::Config;
use fitboard::db::{FirestoreDb, MemoryDb, Store};
use fitboard::middleware::auth::create_jwt;
use fitboard::routes::create_router;
use fitboard::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let db: Arc<dyn Store> = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::new(Config::test_default(), db).expect("valid test config"));
    (create_router(state.clone()), state)
}

/// Create a test JWT for a subject, signed the same way the server signs sessions.
#[allow(dead_code)]
pub fn create_test_jwt(subject: &str, signing_key: &[u8]) -> String {
    create_jwt(subject, signing_key).expect("sign test token")
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sync a user through the API and return their session token.
#[allow(dead_code)]
pub async fn sync_test_user(app: &axum::Router, state: &AppState, subject: &str) -> String {
    use tower::ServiceExt;

    let token = create_test_jwt(subject, &state.config.jwt_signing_key);
    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/users/sync",
            &token,
            Some(serde_json::json!({
                "email": format!("{}@example.com", subject),
                "name": subject,
            })),
        ))
        .await
        .unwrap();
    assert!(response.status().is_success(), "sync failed for {}", subject);
    token
}
