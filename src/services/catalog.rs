// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise catalog: browsing, search and additions.

use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{CatalogExercise, Difficulty, ExerciseType};

/// Catalog entry supplied by a user.
#[derive(Debug, Clone)]
pub struct NewCatalogExercise {
    pub name: String,
    pub category: ExerciseType,
    pub difficulty: Difficulty,
    pub muscle_groups: Vec<String>,
    pub equipment: Vec<String>,
    pub instructions: Vec<String>,
    pub tips: Vec<String>,
    pub estimated_calories: u32,
}

struct SeedExercise {
    name: &'static str,
    category: ExerciseType,
    difficulty: Difficulty,
    muscle_groups: &'static [&'static str],
    instructions: &'static [&'static str],
    tips: &'static [&'static str],
    estimated_calories: u32,
}

const SEED_EXERCISES: [SeedExercise; 3] = [
    SeedExercise {
        name: "Push-ups",
        category: ExerciseType::Strength,
        difficulty: Difficulty::Beginner,
        muscle_groups: &["chest", "shoulders", "triceps"],
        instructions: &[
            "Start in plank position with hands shoulder-width apart",
            "Lower your body until chest nearly touches the floor",
            "Push back up to starting position",
            "Keep your core tight throughout the movement",
        ],
        tips: &["Keep your body in a straight line", "Don't let your hips sag"],
        estimated_calories: 8,
    },
    SeedExercise {
        name: "Squats",
        category: ExerciseType::Strength,
        difficulty: Difficulty::Beginner,
        muscle_groups: &["quadriceps", "glutes", "hamstrings"],
        instructions: &[
            "Stand with feet shoulder-width apart",
            "Lower your body as if sitting back into a chair",
            "Keep your chest up and knees behind toes",
            "Return to standing position",
        ],
        tips: &["Keep weight in your heels", "Don't let knees cave inward"],
        estimated_calories: 6,
    },
    SeedExercise {
        name: "Jumping Jacks",
        category: ExerciseType::Cardio,
        difficulty: Difficulty::Beginner,
        muscle_groups: &["full body"],
        instructions: &[
            "Start standing with feet together, arms at sides",
            "Jump feet apart while raising arms overhead",
            "Jump back to starting position",
            "Maintain steady rhythm",
        ],
        tips: &["Land softly on balls of feet", "Keep core engaged"],
        estimated_calories: 12,
    },
];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sorted_by_name(mut exercises: Vec<CatalogExercise>) -> Vec<CatalogExercise> {
    exercises.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    exercises
}

#[derive(Clone)]
pub struct CatalogService {
    db: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(db: Arc<dyn Store>) -> Self {
        Self { db }
    }

    /// Catalog entries by name, optionally narrowed to a category and difficulty.
    pub async fn list(
        &self,
        category: Option<ExerciseType>,
        difficulty: Option<Difficulty>,
    ) -> Result<Vec<CatalogExercise>> {
        let mut exercises = self.db.catalog_exercises(category).await?;
        if let Some(difficulty) = difficulty {
            exercises.retain(|e| e.difficulty == difficulty);
        }
        Ok(sorted_by_name(exercises))
    }

    /// Entries whose name, muscle groups or category contain `term`, ignoring
    /// case. A blank term matches everything.
    pub async fn search(&self, term: &str) -> Result<Vec<CatalogExercise>> {
        let term = term.trim();
        let mut exercises = self.db.catalog_exercises(None).await?;
        exercises.retain(|e| e.matches(term));
        Ok(sorted_by_name(exercises))
    }

    /// Lookup by name, ignoring case.
    pub async fn by_name(&self, name: &str) -> Result<CatalogExercise> {
        self.db
            .get_catalog_exercise(&CatalogExercise::key(name))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exercise '{}' not found", name.trim())))
    }

    /// Add a user-defined entry. Conflicts if the name is already taken.
    pub async fn add_custom(&self, new: NewCatalogExercise) -> Result<CatalogExercise> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Exercise name must not be blank".to_string(),
            ));
        }

        let exercise = CatalogExercise {
            id: CatalogExercise::key(&name),
            name,
            category: new.category,
            difficulty: new.difficulty,
            muscle_groups: new.muscle_groups,
            equipment: new.equipment,
            instructions: new.instructions,
            tips: new.tips,
            estimated_calories: new.estimated_calories,
            image_url: None,
            video_url: None,
            is_custom: true,
        };
        self.db.insert_catalog_exercise(&exercise).await?;

        tracing::info!(exercise = %exercise.id, "Added custom catalog exercise");
        Ok(exercise)
    }

    /// Insert the built-in entries that are missing. Returns those inserted.
    pub async fn seed(&self) -> Result<Vec<CatalogExercise>> {
        let mut seeded = Vec::new();

        for template in &SEED_EXERCISES {
            let exercise = CatalogExercise {
                id: CatalogExercise::key(template.name),
                name: template.name.to_string(),
                category: template.category,
                difficulty: template.difficulty,
                muscle_groups: owned(template.muscle_groups),
                equipment: Vec::new(),
                instructions: owned(template.instructions),
                tips: owned(template.tips),
                estimated_calories: template.estimated_calories,
                image_url: None,
                video_url: None,
                is_custom: false,
            };
            match self.db.insert_catalog_exercise(&exercise).await {
                Ok(()) => seeded.push(exercise),
                Err(AppError::Conflict(_)) => {
                    tracing::debug!(exercise = %exercise.id, "Catalog entry already present");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(count = seeded.len(), "Seeded exercise catalog");
        Ok(seeded)
    }
}
