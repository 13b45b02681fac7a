// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes for seeding the daily challenges and the exercise catalog.
//! Protected by the admin key middleware applied in routes/mod.rs.

use crate::error::Result;
use crate::models::{CatalogExercise, Challenge, ChallengeType, Difficulty};
use crate::services::NewChallenge;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/challenges", post(create_challenge))
        .route("/admin/challenges/seed", post(seed_challenges))
        .route("/admin/exercises/seed", post(seed_catalog))
}

#[derive(Deserialize, Validate)]
struct CreateChallengeRequest {
    #[validate(length(min = 1, max = 100))]
    title: String,
    #[validate(length(max = 500))]
    description: String,
    challenge_type: ChallengeType,
    target: f64,
    #[validate(range(max = 1000))]
    points: u32,
    difficulty: Difficulty,
    date: Option<String>,
}

async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateChallengeRequest>,
) -> Result<(StatusCode, Json<Challenge>)> {
    req.validate()?;

    let challenge = state
        .challenges
        .create_challenge(NewChallenge {
            title: req.title,
            description: req.description,
            challenge_type: req.challenge_type,
            target: req.target,
            points: req.points,
            difficulty: req.difficulty,
            date: req.date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(challenge)))
}

#[derive(Serialize)]
struct SeedResponse {
    count: usize,
    challenges: Vec<Challenge>,
}

/// Seed one challenge per day for the coming week.
async fn seed_challenges(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>> {
    let challenges = state.challenges.seed_daily_challenges().await?;
    Ok(Json(SeedResponse {
        count: challenges.len(),
        challenges,
    }))
}

#[derive(Serialize)]
struct CatalogSeedResponse {
    count: usize,
    exercises: Vec<CatalogExercise>,
}

/// Insert the built-in catalog entries that are missing.
async fn seed_catalog(State(state): State<Arc<AppState>>) -> Result<Json<CatalogSeedResponse>> {
    let exercises = state.catalog.seed().await?;
    Ok(Json(CatalogSeedResponse {
        count: exercises.len(),
        exercises,
    }))
}
