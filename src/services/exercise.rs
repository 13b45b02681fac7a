// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise logging.
//!
//! The first record of a calendar day earns the daily workout reward
//! (total workouts, streak and base points). The check counts the day's
//! records after the insert while holding a per-user lock, so requests
//! served by one instance cannot both miss or both take the reward.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::Store;
use crate::error::Result;
use crate::models::{ExerciseRecord, ExerciseType, User};
use crate::services::LeaderboardService;
use crate::time_utils::Calendar;

/// Default page size for history.
pub const DEFAULT_HISTORY_LIMIT: u32 = 50;
/// Upper bound on history page size.
pub const MAX_HISTORY_LIMIT: u32 = 100;

/// A workout as described by the user.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub name: String,
    pub exercise_type: ExerciseType,
    pub duration_minutes: u32,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub weight_kg: Option<f64>,
    pub calories: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct ExerciseService {
    db: Arc<dyn Store>,
    calendar: Calendar,
    leaderboard: LeaderboardService,
    /// Per-user locks serializing insert-then-count
    user_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ExerciseService {
    pub fn new(db: Arc<dyn Store>, calendar: Calendar, leaderboard: LeaderboardService) -> Self {
        Self {
            db,
            calendar,
            leaderboard,
            user_locks: Arc::new(DashMap::new()),
        }
    }

    pub async fn log_exercise(&self, user_id: &str, exercise: NewExercise) -> Result<ExerciseRecord> {
        self.log_exercise_at(user_id, exercise, Utc::now()).await
    }

    /// Append a record stamped with `now` and its calendar day.
    pub async fn log_exercise_at(
        &self,
        user_id: &str,
        exercise: NewExercise,
        now: DateTime<Utc>,
    ) -> Result<ExerciseRecord> {
        let date = self.calendar.date_key(now);
        let record = ExerciseRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: exercise.name,
            exercise_type: exercise.exercise_type,
            duration_minutes: exercise.duration_minutes,
            reps: exercise.reps,
            sets: exercise.sets,
            weight_kg: exercise.weight_kg,
            calories: exercise.calories,
            notes: exercise.notes,
            completed_at: now,
            date,
        };
        let lock = self
            .user_locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;

        self.db.insert_exercise(&record).await?;

        let todays = self.db.exercises_on_date(user_id, &record.date).await?;
        if todays.len() == 1 {
            if let Some(user) = self
                .db
                .update_user(user_id, &|user: &mut User| user.record_workout_day())
                .await?
            {
                tracing::info!(
                    user_id,
                    current_streak = user.current_streak,
                    total_points = user.total_points,
                    "First workout of the day"
                );
            }
        }
        drop(guard);

        tracing::debug!(
            user_id,
            exercise_id = %record.id,
            duration = record.duration_minutes,
            "Exercise logged"
        );

        if let Err(e) = self.leaderboard.update_for_event(user_id, now).await {
            tracing::warn!(user_id, error = %e, "Leaderboard update after exercise failed");
        }

        Ok(record)
    }

    /// Most recent records first.
    pub async fn history(&self, user_id: &str, limit: Option<u32>) -> Result<Vec<ExerciseRecord>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.db.recent_exercises(user_id, limit).await
    }
}
