// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points needed to advance one level.
pub const POINTS_PER_LEVEL: u32 = 100;

/// Points credited for the first workout logged on a calendar day.
pub const DAILY_WORKOUT_POINTS: u32 = 10;

/// User profile and cumulative stats stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// External identity provider subject (also used as document ID)
    pub id: String,
    /// Email address, trimmed and lower-cased
    pub email: String,
    /// Display name
    pub name: String,
    /// Profile picture URL
    pub image: Option<String>,
    /// Number of days with at least one logged workout
    #[serde(default)]
    pub total_workouts: u32,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub longest_streak: u32,
    #[serde(default = "default_level")]
    pub level: u32,
    /// When the user first signed in
    pub joined_at: DateTime<Utc>,
}

fn default_level() -> u32 {
    1
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Level reached with the given cumulative points.
pub fn level_for_points(total_points: u32) -> u32 {
    1 + total_points / POINTS_PER_LEVEL
}

impl User {
    /// A freshly joined user with zeroed stats.
    pub fn new(
        id: impl Into<String>,
        email: &str,
        name: impl Into<String>,
        image: Option<String>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            email: normalize_email(email),
            name: name.into(),
            image,
            total_workouts: 0,
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            level: 1,
            joined_at,
        }
    }

    /// Credit points and keep the level in step.
    pub fn add_points(&mut self, points: u32) {
        self.total_points = self.total_points.saturating_add(points);
        self.level = level_for_points(self.total_points);
    }

    /// Apply the once-per-day workout reward.
    ///
    /// The streak counts workout days; it is not reset by missed days.
    pub fn record_workout_day(&mut self) {
        self.total_workouts += 1;
        self.current_streak += 1;
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.add_points(DAILY_WORKOUT_POINTS);
    }

    pub fn public_profile(&self) -> PublicProfile {
        PublicProfile {
            name: self.name.clone(),
            image: self.image.clone(),
            level: self.level,
        }
    }
}

/// Profile fields visible to other users on leaderboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PublicProfile {
    pub name: String,
    pub image: Option<String>,
    pub level: u32,
}
