// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily challenge catalog entries and per-user completions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a challenge target counts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum ChallengeType {
    Reps,
    Duration,
    Steps,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A challenge offered on one calendar day. Read-only once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    /// Generated challenge ID (also used as document ID)
    pub id: String,
    pub title: String,
    pub description: String,
    pub challenge_type: ChallengeType,
    /// Target value (reps, seconds, steps)
    pub target: f64,
    /// Base points before the performance multiplier
    pub points: u32,
    pub difficulty: Difficulty,
    /// Day the challenge is offered (`YYYY-MM-DD`)
    pub date: String,
    pub is_active: bool,
}

/// Multiplier applied to base points for a given `actual / target` ratio.
pub fn performance_multiplier(ratio: f64) -> f64 {
    if ratio >= 1.5 {
        1.5
    } else if ratio >= 1.2 {
        1.2
    } else if ratio < 0.8 {
        0.8
    } else {
        1.0
    }
}

impl Challenge {
    /// Points earned for completing this challenge with `actual_value`.
    ///
    /// A non-positive target has no meaningful ratio and earns base points.
    pub fn points_for(&self, actual_value: f64) -> u32 {
        if self.target <= 0.0 {
            return self.points;
        }
        let multiplier = performance_multiplier(actual_value / self.target);
        (f64::from(self.points) * multiplier).round() as u32
    }
}

/// A user's completion of one challenge. At most one per (user, challenge, day).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeCompletion {
    /// Uniqueness key, see [`ChallengeCompletion::key`]
    pub id: String,
    pub user_id: String,
    pub challenge_id: String,
    pub actual_value: f64,
    pub points_earned: u32,
    /// Native Firestore timestamp
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub completed_at: DateTime<Utc>,
    /// Calendar day of completion (`YYYY-MM-DD`)
    pub date: String,
}

impl ChallengeCompletion {
    /// Document key enforcing one completion per (user, challenge, day).
    pub fn key(user_id: &str, challenge_id: &str, date: &str) -> String {
        format!(
            "{}_{}_{}",
            super::key_segment(user_id),
            super::key_segment(challenge_id),
            date
        )
    }
}
