// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end workout tests through the HTTP API.
//!
//! Exercise logging, challenge completion and the leaderboard views they feed.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

async fn log_run(app: &axum::Router, token: &str, minutes: u32) -> StatusCode {
    app.clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/exercises",
            token,
            Some(json!({
                "name": "Morning run",
                "exercise_type": "cardio",
                "duration_minutes": minutes,
            })),
        ))
        .await
        .unwrap()
        .status()
}

async fn get_json(app: &axum::Router, uri: &str, token: &str) -> Value {
    let response = app
        .clone()
        .oneshot(common::authed_request("GET", uri, token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "GET {}", uri);
    common::json_body(response).await
}

/// Seed a week of challenges and return today's first challenge ID.
async fn seed_today(app: &axum::Router, token: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/challenges/seed")
                .header("x-admin-key", "test_admin_key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let today = get_json(app, "/api/challenges/today", token).await;
    today[0]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_workout_reward_applies_once_per_day() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "runner").await;

    assert_eq!(log_run(&app, &token, 30).await, StatusCode::CREATED);
    assert_eq!(log_run(&app, &token, 15).await, StatusCode::CREATED);

    let me = get_json(&app, "/api/me", &token).await;
    assert_eq!(me["total_workouts"], 1);
    assert_eq!(me["current_streak"], 1);
    assert_eq!(me["total_points"], 10);

    let stats = get_json(&app, "/api/me/stats", &token).await;
    assert_eq!(stats["today_workouts"], 2);
    assert_eq!(stats["weekly_workouts"], 2);
    assert_eq!(stats["weekly_minutes"], 45);
}

#[tokio::test]
async fn test_history_is_most_recent_first() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "runner").await;

    log_run(&app, &token, 10).await;
    log_run(&app, &token, 20).await;

    let history = get_json(&app, "/api/exercises?limit=1", &token).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["duration_minutes"], 20);
}

#[tokio::test]
async fn test_challenge_completion_is_once_per_day() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "climber").await;
    let challenge_id = seed_today(&app, &token).await;
    let uri = format!("/api/challenges/{}/complete", challenge_id);

    // Morning Energizer: 15 points for hitting the 20 rep target
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            &uri,
            &token,
            Some(json!({ "actual_value": 20.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::json_body(response).await;
    assert_eq!(body["points_earned"], 15);

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            &uri,
            &token,
            Some(json!({ "actual_value": 40.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let me = get_json(&app, "/api/me", &token).await;
    assert_eq!(me["total_points"], 15);

    let completions = get_json(&app, "/api/challenges/completions/today", &token).await;
    assert_eq!(completions.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_challenge_returns_404() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "climber").await;

    let response = app
        .oneshot(common::authed_request(
            "POST",
            "/api/challenges/does-not-exist/complete",
            &token,
            Some(json!({ "actual_value": 10.0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_reflects_activity() {
    let (app, state) = common::create_test_app();
    let alice = common::sync_test_user(&app, &state, "alice").await;
    let bob = common::sync_test_user(&app, &state, "bob").await;
    let challenge_id = seed_today(&app, &alice).await;

    // Bob works out but earns no challenge points; Alice completes a challenge.
    assert_eq!(log_run(&app, &bob, 45).await, StatusCode::CREATED);
    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            &format!("/api/challenges/{}/complete", challenge_id),
            &alice,
            Some(json!({ "actual_value": 30.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let board = get_json(&app, "/api/leaderboard", &alice).await;
    let board = board.as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["user_id"], "alice");
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["weekly_points"], 23);
    assert_eq!(board[0]["user"]["name"], "alice");
    assert_eq!(board[1]["user_id"], "bob");
    assert_eq!(board[1]["rank"], 2);
    assert_eq!(board[1]["weekly_workouts"], 1);
    assert_eq!(board[1]["weekly_minutes"], 45);

    let position = get_json(&app, "/api/leaderboard/me", &bob).await;
    assert_eq!(position["rank"], 2);
    assert_eq!(position["total_participants"], 2);
}

#[tokio::test]
async fn test_position_is_null_without_activity() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "idle").await;

    let position = get_json(&app, "/api/leaderboard/me", &token).await;
    assert!(position.is_null());
}

#[tokio::test]
async fn test_refresh_creates_entry() {
    let (app, state) = common::create_test_app();
    let token = common::sync_test_user(&app, &state, "idle").await;

    let response = app
        .clone()
        .oneshot(common::authed_request(
            "POST",
            "/api/leaderboard/refresh",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let entry = common::json_body(response).await;
    assert_eq!(entry["user_id"], "idle");
    assert_eq!(entry["rank"], 1);
    assert_eq!(entry["weekly_points"], 0);

    let position = get_json(&app, "/api/leaderboard/me", &token).await;
    assert_eq!(position["rank"], 1);
}
