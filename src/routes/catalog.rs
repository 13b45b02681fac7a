// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{CatalogExercise, Difficulty, ExerciseType};
use crate::routes::api::caller;
use crate::services::NewCatalogExercise;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Highest accepted calorie estimate, per minute.
const MAX_CALORIES_PER_MINUTE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/exercises/catalog",
            get(get_catalog).post(add_custom_exercise),
        )
        .route("/api/exercises/catalog/search", get(search_catalog))
        .route("/api/exercises/catalog/{name}", get(get_catalog_exercise))
}

#[derive(Deserialize)]
struct CatalogQuery {
    category: Option<ExerciseType>,
    difficulty: Option<Difficulty>,
}

async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<CatalogExercise>>> {
    Ok(Json(
        state.catalog.list(query.category, query.difficulty).await?,
    ))
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_catalog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<CatalogExercise>>> {
    Ok(Json(state.catalog.search(&query.q).await?))
}

async fn get_catalog_exercise(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<CatalogExercise>> {
    Ok(Json(state.catalog.by_name(&name).await?))
}

#[derive(Deserialize, Validate)]
struct AddExerciseRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    category: ExerciseType,
    difficulty: Difficulty,
    #[validate(length(max = 20))]
    #[serde(default)]
    muscle_groups: Vec<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    equipment: Vec<String>,
    #[validate(length(max = 30))]
    #[serde(default)]
    instructions: Vec<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    tips: Vec<String>,
    #[validate(range(max = MAX_CALORIES_PER_MINUTE))]
    estimated_calories: u32,
}

/// Add a user-defined exercise to the shared catalog.
async fn add_custom_exercise(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<AddExerciseRequest>,
) -> Result<(StatusCode, Json<CatalogExercise>)> {
    req.validate()?;
    let user = caller(&state, &auth).await?;

    let exercise = state
        .catalog
        .add_custom(NewCatalogExercise {
            name: req.name,
            category: req.category,
            difficulty: req.difficulty,
            muscle_groups: req.muscle_groups,
            equipment: req.equipment,
            instructions: req.instructions,
            tips: req.tips,
            estimated_calories: req.estimated_calories,
        })
        .await?;

    tracing::debug!(user_id = %user.id, exercise = %exercise.id, "Catalog entry added by user");
    Ok((StatusCode::CREATED, Json(exercise)))
}
