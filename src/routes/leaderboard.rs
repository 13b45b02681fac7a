// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly leaderboard routes.
//!
//! Every route takes an optional `week_start` (a Monday, `YYYY-MM-DD`);
//! without it the current week is used.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::LeaderboardEntry;
use crate::routes::api::{caller, WeekQuery};
use crate::services::leaderboard::{FriendStanding, LeaderboardRow, UserPosition};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/leaderboard", get(get_weekly_leaderboard))
        .route("/api/leaderboard/refresh", post(refresh_leaderboard))
        .route("/api/leaderboard/me", get(get_my_position))
        .route("/api/leaderboard/friends", get(get_friends_leaderboard))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    week_start: Option<String>,
    limit: Option<u32>,
}

/// Recompute the caller's totals for the week and re-rank it.
async fn refresh_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<LeaderboardEntry>> {
    let user = caller(&state, &auth).await?;
    let week_start = state.leaderboard.resolve_week(query.week_start.as_deref())?;
    let entry = state.leaderboard.update_weekly(&user.id, week_start).await?;
    Ok(Json(entry))
}

async fn get_weekly_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardRow>>> {
    caller(&state, &auth).await?;
    let week_start = state.leaderboard.resolve_week(query.week_start.as_deref())?;
    let rows = state
        .leaderboard
        .weekly_leaderboard(week_start, query.limit)
        .await?;
    Ok(Json(rows))
}

/// The caller's standing; JSON `null` when they have no entry this week.
async fn get_my_position(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Option<UserPosition>>> {
    let user = caller(&state, &auth).await?;
    let week_start = state.leaderboard.resolve_week(query.week_start.as_deref())?;
    Ok(Json(
        state.leaderboard.user_position(&user.id, week_start).await?,
    ))
}

async fn get_friends_leaderboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<FriendStanding>>> {
    let user = caller(&state, &auth).await?;
    let week_start = state.leaderboard.resolve_week(query.week_start.as_deref())?;
    Ok(Json(
        state
            .leaderboard
            .friends_leaderboard(&user.id, week_start)
            .await?,
    ))
}
