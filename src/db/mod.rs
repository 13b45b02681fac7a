// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`Store`] is the document-store seam: point lookups, index-style scans,
//! inserts and patches. Cross-entity composition happens in the services.
//! Conditional inserts fail with [`AppError::Conflict`] when the document
//! key already exists.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{
    Achievement, CatalogExercise, Challenge, ChallengeCompletion, ExerciseRecord, ExerciseType,
    Friendship, LeaderboardEntry, User, WeeklyTotals,
};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EXERCISES: &str = "exercise_progress";
    /// Exercise catalog (keyed by lowercased name)
    pub const CATALOG: &str = "exercises";
    pub const CHALLENGES: &str = "daily_challenges";
    pub const COMPLETIONS: &str = "challenge_completions";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const FRIENDSHIPS: &str = "friendships";
    /// Weekly leaderboard entries (keyed by user + week)
    pub const LEADERBOARDS: &str = "leaderboards";
}

/// Mutation applied to a user document in place.
pub type UserUpdate<'a> = &'a (dyn Fn(&mut User) + Send + Sync);

#[async_trait]
pub trait Store: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    /// Look up a user by (normalized) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user; conflicts if the subject is already registered.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Apply `update` to the stored user as one write.
    /// Returns the updated user, or `None` if it does not exist.
    async fn update_user(&self, user_id: &str, update: UserUpdate<'_>) -> Result<Option<User>>;

    // ─── Exercise Log ────────────────────────────────────────────

    async fn insert_exercise(&self, record: &ExerciseRecord) -> Result<()>;

    /// Records stamped with the given day (`by_user_date`).
    async fn exercises_on_date(&self, user_id: &str, date: &str) -> Result<Vec<ExerciseRecord>>;

    /// Records stamped with a day in `[from_date, to_date]`.
    async fn exercises_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ExerciseRecord>>;

    /// Most recent records first.
    async fn recent_exercises(&self, user_id: &str, limit: u32) -> Result<Vec<ExerciseRecord>>;

    // ─── Exercise Catalog ────────────────────────────────────────

    async fn get_catalog_exercise(&self, key: &str) -> Result<Option<CatalogExercise>>;

    /// Conditional insert keyed by lowercased name.
    async fn insert_catalog_exercise(&self, exercise: &CatalogExercise) -> Result<()>;

    /// Whole catalog, or one category (`by_category`), in no particular order.
    async fn catalog_exercises(&self, category: Option<ExerciseType>)
        -> Result<Vec<CatalogExercise>>;

    // ─── Challenges ──────────────────────────────────────────────

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>>;

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<()>;

    /// Challenges offered on a day (`by_date`), active or not.
    async fn challenges_on_date(&self, date: &str) -> Result<Vec<Challenge>>;

    async fn find_completion(
        &self,
        user_id: &str,
        challenge_id: &str,
        date: &str,
    ) -> Result<Option<ChallengeCompletion>>;

    /// Conditional insert keyed by (user, challenge, day).
    async fn insert_completion(&self, completion: &ChallengeCompletion) -> Result<()>;

    async fn completions_for_user(&self, user_id: &str) -> Result<Vec<ChallengeCompletion>>;

    async fn completions_on_date(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<ChallengeCompletion>>;

    async fn completions_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ChallengeCompletion>>;

    // ─── Achievements ────────────────────────────────────────────

    async fn find_achievement(&self, user_id: &str, kind: &str) -> Result<Option<Achievement>>;

    /// Conditional insert keyed by (user, kind).
    async fn insert_achievement(&self, achievement: &Achievement) -> Result<()>;

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<Achievement>>;

    async fn all_achievements(&self) -> Result<Vec<Achievement>>;

    // ─── Friendships ─────────────────────────────────────────────

    async fn find_friendship(&self, user_id: &str, friend_id: &str) -> Result<Option<Friendship>>;

    /// Write all edges together (both directions of a friendship).
    async fn insert_friendships(&self, edges: &[Friendship]) -> Result<()>;

    /// Outgoing edges of a user (`by_user`).
    async fn friendships_for_user(&self, user_id: &str) -> Result<Vec<Friendship>>;

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn get_leaderboard_entry(
        &self,
        user_id: &str,
        week_start: &str,
    ) -> Result<Option<LeaderboardEntry>>;

    /// Patch the weekly totals of an entry, inserting it unranked if absent.
    /// The rank of an existing entry is left untouched.
    async fn upsert_leaderboard_totals(
        &self,
        user_id: &str,
        week_start: &str,
        totals: WeeklyTotals,
    ) -> Result<LeaderboardEntry>;

    /// All entries of a week (`by_week`), in no particular order.
    async fn leaderboard_for_week(&self, week_start: &str) -> Result<Vec<LeaderboardEntry>>;

    /// Ranked entries of a week by rank ascending; unranked entries are skipped.
    async fn leaderboard_top(&self, week_start: &str, limit: u32)
        -> Result<Vec<LeaderboardEntry>>;

    /// Persist the `rank` field of each given entry.
    async fn set_leaderboard_ranks(&self, entries: &[LeaderboardEntry]) -> Result<()>;
}

/// Error for a conditional insert that found an existing document.
pub(crate) fn already_exists(what: &str, key: &str) -> AppError {
    AppError::Conflict(format!("{} {} already exists", what, key))
}
