// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog: reference descriptions of movements users can log.

use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, ExerciseType};

/// One catalog entry. Names are unique ignoring case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatalogExercise {
    /// Derived from the name, see [`CatalogExercise::key`]
    pub id: String,
    pub name: String,
    pub category: ExerciseType,
    pub difficulty: Difficulty,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    /// Per minute of activity
    pub estimated_calories: u32,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    /// Added by a user rather than the built-in seed
    #[serde(default)]
    pub is_custom: bool,
}

impl CatalogExercise {
    /// Document key: the trimmed, lowercased name.
    pub fn key(name: &str) -> String {
        super::key_segment(&name.trim().to_lowercase())
    }

    /// Case-insensitive substring match over name, muscle groups and category.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .muscle_groups
                .iter()
                .any(|m| m.to_lowercase().contains(&term))
            || self.category.as_str().contains(&term)
    }
}
