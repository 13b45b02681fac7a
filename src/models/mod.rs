// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod achievement;
pub mod catalog;
pub mod challenge;
pub mod exercise;
pub mod friendship;
pub mod leaderboard;
pub mod progress;
pub mod user;

/// Percent-encode one component of a composite document key.
///
/// `_` separates components, so it is escaped along with the characters
/// `urlencoding` already escapes.
pub(crate) fn key_segment(raw: &str) -> String {
    urlencoding::encode(raw).replace('_', "%5F")
}

pub use achievement::{Achievement, AchievementTemplate};
pub use catalog::CatalogExercise;
pub use challenge::{Challenge, ChallengeCompletion, ChallengeType, Difficulty};
pub use exercise::{ExerciseRecord, ExerciseType};
pub use friendship::{Friendship, FriendshipStatus};
pub use leaderboard::{LeaderboardEntry, WeeklyTotals};
pub use user::{PublicProfile, User};
