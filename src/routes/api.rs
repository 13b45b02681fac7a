// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::progress::{DailyProgress, ProgressTrends, WeeklyProgress};
use crate::models::{Achievement, Challenge, ChallengeCompletion, ExerciseRecord, ExerciseType, User};
use crate::services::achievements::AvailableAchievement;
use crate::services::users::DashboardStats;
use crate::services::{FriendProfile, IdentityProfile, NewExercise};
use crate::time_utils::parse_date_key;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Longest accepted workout, one day.
const MAX_DURATION_MINUTES: u32 = 24 * 60;
const MAX_REPS: u32 = 10_000;
const MAX_SETS: u32 = 1_000;
const MAX_WEIGHT_KG: f64 = 1_000.0;
const MAX_CALORIES: u32 = 20_000;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/sync", post(sync_user))
        .route("/api/me", get(get_me))
        .route("/api/me/stats", get(get_my_stats))
        .route("/api/exercises", post(log_exercise).get(get_exercise_history))
        .route("/api/progress/daily", get(get_daily_progress))
        .route("/api/progress/weekly", get(get_weekly_progress))
        .route("/api/progress/trends", get(get_progress_trends))
        .route("/api/challenges/today", get(get_todays_challenges))
        .route(
            "/api/challenges/completions/today",
            get(get_todays_completions),
        )
        .route("/api/challenges/{id}/complete", post(complete_challenge))
        .route("/api/achievements", get(get_achievements))
        .route("/api/achievements/available", get(get_available_achievements))
        .route("/api/friends", post(add_friend).get(get_friends))
}

/// Resolve the caller, failing with NotFound before the first sync.
pub(crate) async fn caller(state: &AppState, auth: &AuthUser) -> Result<User> {
    state.users.require_user(&auth.subject).await
}

/// ID of a newly created record.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreatedResponse {
    pub id: String,
}

// ─── User Profile ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct SyncUserRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(url)]
    image: Option<String>,
}

/// Look up or create the caller's user record from identity provider fields.
async fn sync_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SyncUserRequest>,
) -> Result<Json<User>> {
    req.validate()?;

    let user = state
        .users
        .sync_user(
            &auth.subject,
            IdentityProfile {
                email: req.email,
                name: req.name,
                image: req.image,
            },
        )
        .await?;
    Ok(Json(user))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<User>> {
    Ok(Json(caller(&state, &auth).await?))
}

/// Profile plus today's and this week's activity.
async fn get_my_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(state.users.dashboard_stats(&auth.subject).await?))
}

// ─── Exercises ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct LogExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    exercise_type: ExerciseType,
    #[validate(range(min = 1, max = MAX_DURATION_MINUTES))]
    duration_minutes: u32,
    #[validate(range(max = MAX_REPS))]
    reps: Option<u32>,
    #[validate(range(max = MAX_SETS))]
    sets: Option<u32>,
    #[validate(range(min = 0.0, max = MAX_WEIGHT_KG))]
    weight_kg: Option<f64>,
    #[validate(range(max = MAX_CALORIES))]
    calories: Option<u32>,
    #[validate(length(max = 1000))]
    notes: Option<String>,
}

/// Log a workout for the caller.
async fn log_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<LogExerciseRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    req.validate()?;
    let user = caller(&state, &auth).await?;

    let record = state
        .exercises
        .log_exercise(
            &user.id,
            NewExercise {
                name: req.name,
                exercise_type: req.exercise_type,
                duration_minutes: req.duration_minutes,
                reps: req.reps,
                sets: req.sets,
                weight_kg: req.weight_kg,
                calories: req.calories,
                notes: req.notes,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: record.id })))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<u32>,
}

/// Caller's workouts, most recent first.
async fn get_exercise_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ExerciseRecord>>> {
    let user = caller(&state, &auth).await?;
    Ok(Json(state.exercises.history(&user.id, query.limit).await?))
}

// ─── Progress ────────────────────────────────────────────────

#[derive(Deserialize)]
struct DailyQuery {
    /// `YYYY-MM-DD`, defaults to today
    date: Option<String>,
}

async fn get_daily_progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<DailyQuery>,
) -> Result<Json<DailyProgress>> {
    let user = caller(&state, &auth).await?;
    let date = match query.date.as_deref() {
        Some(raw) => parse_date_key(raw)?,
        None => state.calendar.local_date(chrono::Utc::now()),
    };
    Ok(Json(state.progress.daily(&user.id, date).await?))
}

#[derive(Deserialize)]
pub(crate) struct WeekQuery {
    pub week_start: Option<String>,
}

async fn get_weekly_progress(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeeklyProgress>> {
    let user = caller(&state, &auth).await?;
    let week_start = state
        .calendar
        .resolve_week(query.week_start.as_deref(), chrono::Utc::now())?;
    Ok(Json(state.progress.weekly(&user.id, week_start).await?))
}

async fn get_progress_trends(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProgressTrends>> {
    let user = caller(&state, &auth).await?;
    Ok(Json(state.progress.trends(&user.id).await?))
}

// ─── Challenges ──────────────────────────────────────────────

async fn get_todays_challenges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Challenge>>> {
    caller(&state, &auth).await?;
    Ok(Json(state.challenges.todays_challenges().await?))
}

async fn get_todays_completions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ChallengeCompletion>>> {
    let user = caller(&state, &auth).await?;
    Ok(Json(state.challenges.completions_today(&user.id).await?))
}

#[derive(Deserialize, Validate)]
struct CompleteChallengeRequest {
    #[validate(range(min = 0.0))]
    actual_value: f64,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompletionResponse {
    pub id: String,
    pub points_earned: u32,
}

async fn complete_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(challenge_id): Path<String>,
    Json(req): Json<CompleteChallengeRequest>,
) -> Result<(StatusCode, Json<CompletionResponse>)> {
    req.validate()?;
    let user = caller(&state, &auth).await?;

    let completion = state
        .challenges
        .complete_challenge(&user.id, &challenge_id, req.actual_value)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CompletionResponse {
            id: completion.id,
            points_earned: completion.points_earned,
        }),
    ))
}

// ─── Achievements ────────────────────────────────────────────

async fn get_achievements(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<Achievement>>> {
    let user = caller(&state, &auth).await?;
    Ok(Json(state.achievements.for_user(&user.id).await?))
}

async fn get_available_achievements(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<AvailableAchievement>>> {
    caller(&state, &auth).await?;
    Ok(Json(state.achievements.available().await?))
}

// ─── Friends ─────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct AddFriendRequest {
    #[validate(email)]
    email: String,
}

async fn add_friend(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AddFriendRequest>,
) -> Result<(StatusCode, Json<FriendProfile>)> {
    req.validate()?;
    let user = caller(&state, &auth).await?;
    let friend = state.friends.add_friend(&user.id, &req.email).await?;
    Ok((StatusCode::CREATED, Json(friend)))
}

async fn get_friends(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<FriendProfile>>> {
    let user = caller(&state, &auth).await?;
    Ok(Json(state.friends.friends(&user.id).await?))
}
