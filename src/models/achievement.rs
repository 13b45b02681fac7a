// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Unlocked achievements (badges).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Distinct challenge days needed for the Week Warrior badge.
pub const WEEK_WARRIOR_DAYS: usize = 7;

/// Static description of an unlockable achievement.
#[derive(Debug, Clone, Copy)]
pub struct AchievementTemplate {
    /// Unique per user; at most one achievement of each kind is awarded
    pub kind: &'static str,
    pub category: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub points_awarded: u32,
}

pub const WEEK_WARRIOR: AchievementTemplate = AchievementTemplate {
    kind: "7_day_challenge_streak",
    category: "streak",
    title: "Week Warrior",
    description: "Complete challenges for 7 consecutive days",
    points_awarded: 100,
};

/// An achievement unlocked by a user. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    /// Uniqueness key, see [`Achievement::key`]
    pub id: String,
    pub user_id: String,
    pub kind: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub points_awarded: u32,
    /// Native Firestore timestamp
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub unlocked_at: DateTime<Utc>,
}

impl Achievement {
    /// Document key enforcing one achievement per (user, kind).
    pub fn key(user_id: &str, kind: &str) -> String {
        format!("{}_{}", super::key_segment(user_id), kind)
    }

    pub fn unlock(user_id: &str, template: &AchievementTemplate, at: DateTime<Utc>) -> Self {
        Self {
            id: Self::key(user_id, template.kind),
            user_id: user_id.to_string(),
            kind: template.kind.to_string(),
            category: template.category.to_string(),
            title: template.title.to_string(),
            description: template.description.to_string(),
            points_awarded: template.points_awarded,
            unlocked_at: at,
        }
    }
}
