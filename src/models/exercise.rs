// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged workout records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad workout category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ExerciseType {
    Cardio,
    Strength,
    Flexibility,
    Custom,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Cardio => "cardio",
            ExerciseType::Strength => "strength",
            ExerciseType::Flexibility => "flexibility",
            ExerciseType::Custom => "custom",
        }
    }
}

/// A single logged workout. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    /// Generated record ID (also used as document ID)
    pub id: String,
    /// Owner
    pub user_id: String,
    pub name: String,
    pub exercise_type: ExerciseType,
    pub duration_minutes: u32,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
    pub weight_kg: Option<f64>,
    pub calories: Option<u32>,
    pub notes: Option<String>,
    /// Native Firestore timestamp
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub completed_at: DateTime<Utc>,
    /// Calendar day (`YYYY-MM-DD`) stamped at write time; never recomputed
    pub date: String,
}
