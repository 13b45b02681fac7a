// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Achievement unlocks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::{Achievement, AchievementTemplate};

/// An achievement someone has unlocked, without the owner.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AvailableAchievement {
    pub category: String,
    pub title: String,
    pub description: String,
    pub points_awarded: u32,
}

#[derive(Clone)]
pub struct AchievementService {
    db: Arc<dyn Store>,
}

impl AchievementService {
    pub fn new(db: Arc<dyn Store>) -> Self {
        Self { db }
    }

    /// Unlock `template` for the user unless already unlocked.
    /// Returns the new achievement, or `None` if it was already held.
    pub async fn award_once(
        &self,
        user_id: &str,
        template: &AchievementTemplate,
        at: DateTime<Utc>,
    ) -> Result<Option<Achievement>> {
        if self.db.find_achievement(user_id, template.kind).await?.is_some() {
            return Ok(None);
        }

        let achievement = Achievement::unlock(user_id, template, at);
        match self.db.insert_achievement(&achievement).await {
            Ok(()) => {
                tracing::info!(user_id, kind = template.kind, "Achievement unlocked");
                Ok(Some(achievement))
            }
            // Lost the race to a concurrent award.
            Err(AppError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// The user's achievements, most recent first.
    pub async fn for_user(&self, user_id: &str) -> Result<Vec<Achievement>> {
        self.db.achievements_for_user(user_id).await
    }

    /// Distinct (category, title) pairs across all unlocked achievements.
    pub async fn available(&self) -> Result<Vec<AvailableAchievement>> {
        let mut seen = HashSet::new();
        let mut available = Vec::new();
        for achievement in self.db.all_achievements().await? {
            if seen.insert((achievement.category.clone(), achievement.title.clone())) {
                available.push(AvailableAchievement {
                    category: achievement.category,
                    title: achievement.title,
                    description: achievement.description,
                    points_awarded: achievement.points_awarded,
                });
            }
        }
        Ok(available)
    }
}
