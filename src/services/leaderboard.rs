// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly leaderboard aggregation and read views.
//!
//! An update runs as a two-step pipeline for one (user, week):
//! 1. Recompute the user's weekly totals from exercise and completion records
//! 2. Re-rank every entry of the week and persist the ranks that moved
//!
//! Both steps run under a per-week lock so that two triggers for the same
//! week inside this process cannot interleave their rank writes.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::db::Store;
use crate::error::Result;
use crate::models::leaderboard::rank_entries;
use crate::models::{FriendshipStatus, LeaderboardEntry, PublicProfile, WeeklyTotals};
use crate::time_utils::{format_date_key, Calendar};

/// Default number of rows in the global view.
pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 50;
/// Upper bound on rows in the global view.
pub const MAX_LEADERBOARD_LIMIT: u32 = 100;

/// Shared per-week locks, keyed by week start.
pub type WeekLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// One row of the global leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardRow {
    pub rank: u32,
    pub user_id: String,
    pub weekly_workouts: u32,
    pub weekly_points: u32,
    pub weekly_minutes: u32,
    pub user: PublicProfile,
}

/// The caller's own standing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserPosition {
    pub week_start: String,
    pub rank: u32,
    pub weekly_workouts: u32,
    pub weekly_points: u32,
    pub weekly_minutes: u32,
    /// Entries in the week, ranked or not
    pub total_participants: u32,
}

/// One row of the friends-only leaderboard.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FriendStanding {
    /// Position among the caller and their friends
    pub friend_rank: u32,
    /// Global rank, for reference
    pub rank: u32,
    pub user_id: String,
    pub weekly_workouts: u32,
    pub weekly_points: u32,
    pub weekly_minutes: u32,
    pub user: PublicProfile,
    pub is_current_user: bool,
}

/// Maintains and reads the weekly leaderboard.
#[derive(Clone)]
pub struct LeaderboardService {
    db: Arc<dyn Store>,
    calendar: Calendar,
    week_locks: WeekLocks,
}

impl LeaderboardService {
    pub fn new(db: Arc<dyn Store>, calendar: Calendar) -> Self {
        Self {
            db,
            calendar,
            week_locks: Arc::new(DashMap::new()),
        }
    }

    /// Resolve an optional `week_start` argument against the current time.
    pub fn resolve_week(&self, requested: Option<&str>) -> Result<NaiveDate> {
        self.calendar.resolve_week(requested, Utc::now())
    }

    // ─── Aggregation ─────────────────────────────────────────────

    /// Recompute the user's totals for the week containing `at` and re-rank it.
    pub async fn update_for_event(&self, user_id: &str, at: DateTime<Utc>) -> Result<()> {
        let week_start = self.calendar.week_start(at);
        self.update_weekly(user_id, week_start).await?;
        Ok(())
    }

    /// Recompute one user's entry for a week, then re-rank the whole week.
    pub async fn update_weekly(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<LeaderboardEntry> {
        let week_key = format_date_key(week_start);

        let lock = self
            .week_locks
            .entry(week_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let entry = self.recompute_user_week(user_id, week_start).await?;
        let moved = self.rerank_week(&week_key).await?;

        tracing::debug!(
            user_id,
            week_start = %week_key,
            weekly_points = entry.weekly_points,
            ranks_moved = moved,
            "Leaderboard updated"
        );

        // Return the entry with the rank it now holds.
        Ok(self
            .db
            .get_leaderboard_entry(user_id, &week_key)
            .await?
            .unwrap_or(entry))
    }

    /// Step 1: rebuild the user's weekly totals from source records.
    /// An existing rank is left as is.
    pub async fn recompute_user_week(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<LeaderboardEntry> {
        let (start, end) = self.calendar.week_bounds(week_start);
        let week_key = format_date_key(week_start);
        let last_day = format_date_key(week_start + chrono::Duration::days(6));

        // Date stamps narrow the scan; timestamps decide membership.
        let exercises = self
            .db
            .exercises_between_dates(user_id, &week_key, &last_day)
            .await?;
        let completions = self
            .db
            .completions_between_dates(user_id, &week_key, &last_day)
            .await?;

        let totals = WeeklyTotals::from_records(&exercises, &completions, start, end);
        self.db
            .upsert_leaderboard_totals(user_id, &week_key, totals)
            .await
    }

    /// Step 2: assign 1-based ranks to every entry of the week.
    /// Returns how many ranks changed.
    pub async fn rerank_week(&self, week_key: &str) -> Result<usize> {
        let mut entries = self.db.leaderboard_for_week(week_key).await?;
        let changed = rank_entries(&mut entries);
        if !changed.is_empty() {
            self.db.set_leaderboard_ranks(&changed).await?;
        }
        Ok(changed.len())
    }

    // ─── Read Views ──────────────────────────────────────────────

    /// Top entries of the week by rank, joined with public profiles.
    /// Entries whose user no longer exists are dropped.
    pub async fn weekly_leaderboard(
        &self,
        week_start: NaiveDate,
        limit: Option<u32>,
    ) -> Result<Vec<LeaderboardRow>> {
        let limit = limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        let entries = self
            .db
            .leaderboard_top(&format_date_key(week_start), limit)
            .await?;

        let mut rows = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(user) = self.db.get_user(&entry.user_id).await? else {
                continue;
            };
            rows.push(LeaderboardRow {
                rank: entry.rank,
                user_id: entry.user_id,
                weekly_workouts: entry.weekly_workouts,
                weekly_points: entry.weekly_points,
                weekly_minutes: entry.weekly_minutes,
                user: user.public_profile(),
            });
        }
        Ok(rows)
    }

    /// The caller's entry plus the number of participants, or `None` if the
    /// caller has no entry for the week.
    pub async fn user_position(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Option<UserPosition>> {
        let week_key = format_date_key(week_start);
        let Some(entry) = self.db.get_leaderboard_entry(user_id, &week_key).await? else {
            return Ok(None);
        };
        let total_participants = self.db.leaderboard_for_week(&week_key).await?.len() as u32;

        Ok(Some(UserPosition {
            week_start: entry.week_start,
            rank: entry.rank,
            weekly_workouts: entry.weekly_workouts,
            weekly_points: entry.weekly_points,
            weekly_minutes: entry.weekly_minutes,
            total_participants,
        }))
    }

    /// Standings among the caller and their accepted friends, ranked by
    /// weekly points only. Friend rank is independent of the global rank.
    pub async fn friends_leaderboard(
        &self,
        user_id: &str,
        week_start: NaiveDate,
    ) -> Result<Vec<FriendStanding>> {
        let week_key = format_date_key(week_start);

        let mut member_ids: Vec<String> = self
            .db
            .friendships_for_user(user_id)
            .await?
            .into_iter()
            .filter(|f| f.status == FriendshipStatus::Accepted)
            .map(|f| f.friend_id)
            .collect();
        member_ids.push(user_id.to_string());

        let mut standings = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            let Some(entry) = self.db.get_leaderboard_entry(&member_id, &week_key).await? else {
                continue;
            };
            let Some(user) = self.db.get_user(&member_id).await? else {
                continue;
            };
            standings.push(FriendStanding {
                friend_rank: 0,
                rank: entry.rank,
                is_current_user: member_id == user_id,
                user_id: member_id,
                weekly_workouts: entry.weekly_workouts,
                weekly_points: entry.weekly_points,
                weekly_minutes: entry.weekly_minutes,
                user: user.public_profile(),
            });
        }

        // Stable sort: equal points keep friend-list order.
        standings.sort_by(|a, b| b.weekly_points.cmp(&a.weekly_points));
        for (index, standing) in standings.iter_mut().enumerate() {
            standing.friend_rank = index as u32 + 1;
        }
        Ok(standings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::{ChallengeCompletion, ExerciseRecord, ExerciseType, Friendship, User};
    use chrono::TimeZone;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    async fn seed_user(db: &MemoryDb, id: &str) {
        let user = User::new(id, &format!("{}@example.com", id), id, None, at(1, 0));
        db.create_user(&user).await.unwrap();
    }

    async fn seed_exercise(db: &MemoryDb, user_id: &str, when: DateTime<Utc>, minutes: u32) {
        let record = ExerciseRecord {
            id: format!("{}-{}", user_id, when.timestamp()),
            user_id: user_id.to_string(),
            name: "Run".to_string(),
            exercise_type: ExerciseType::Cardio,
            duration_minutes: minutes,
            reps: None,
            sets: None,
            weight_kg: None,
            calories: None,
            notes: None,
            completed_at: when,
            date: Calendar::utc().date_key(when),
        };
        db.insert_exercise(&record).await.unwrap();
    }

    async fn seed_completion(db: &MemoryDb, user_id: &str, when: DateTime<Utc>, points: u32) {
        let date = Calendar::utc().date_key(when);
        let challenge_id = format!("c{}", when.timestamp());
        let completion = ChallengeCompletion {
            id: ChallengeCompletion::key(user_id, &challenge_id, &date),
            user_id: user_id.to_string(),
            challenge_id,
            actual_value: 10.0,
            points_earned: points,
            completed_at: when,
            date,
        };
        db.insert_completion(&completion).await.unwrap();
    }

    fn service(db: &MemoryDb) -> LeaderboardService {
        LeaderboardService::new(Arc::new(db.clone()), Calendar::utc())
    }

    #[tokio::test]
    async fn test_update_weekly_counts_only_this_week() {
        let db = MemoryDb::new();
        seed_user(&db, "a").await;
        seed_exercise(&db, "a", at(15, 8), 30).await;
        seed_exercise(&db, "a", at(21, 23), 20).await;
        seed_exercise(&db, "a", at(22, 0), 99).await; // next Monday
        seed_completion(&db, "a", at(16, 9), 15).await;

        let entry = service(&db).update_weekly("a", monday()).await.unwrap();

        assert_eq!(entry.weekly_workouts, 2);
        assert_eq!(entry.weekly_minutes, 50);
        assert_eq!(entry.weekly_points, 15);
        assert_eq!(entry.rank, 1);
    }

    #[tokio::test]
    async fn test_second_user_reranks_the_week() {
        let db = MemoryDb::new();
        let svc = service(&db);
        seed_user(&db, "a").await;
        seed_user(&db, "b").await;
        seed_completion(&db, "a", at(15, 8), 10).await;
        seed_completion(&db, "b", at(15, 9), 30).await;

        svc.update_weekly("a", monday()).await.unwrap();
        let b = svc.update_weekly("b", monday()).await.unwrap();
        assert_eq!(b.rank, 1);

        let a = db
            .get_leaderboard_entry("a", "2024-01-15")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.rank, 2);
    }

    #[tokio::test]
    async fn test_rerank_twice_changes_nothing() {
        let db = MemoryDb::new();
        let svc = service(&db);
        for (user, points) in [("a", 5), ("b", 50), ("c", 20)] {
            seed_user(&db, user).await;
            seed_completion(&db, user, at(17, 12), points).await;
            svc.recompute_user_week(user, monday()).await.unwrap();
        }

        assert_eq!(svc.rerank_week("2024-01-15").await.unwrap(), 3);
        assert_eq!(svc.rerank_week("2024-01-15").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_weekly_view_drops_missing_users() {
        let db = MemoryDb::new();
        let svc = service(&db);
        seed_user(&db, "a").await;
        seed_completion(&db, "a", at(15, 8), 10).await;
        seed_completion(&db, "ghost", at(15, 8), 99).await;

        svc.update_weekly("a", monday()).await.unwrap();
        svc.update_weekly("ghost", monday()).await.unwrap();

        let rows = svc.weekly_leaderboard(monday(), None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "a");
        assert_eq!(rows[0].rank, 2);
    }

    #[tokio::test]
    async fn test_user_position_absent_without_entry() {
        let db = MemoryDb::new();
        seed_user(&db, "a").await;
        let position = service(&db).user_position("a", monday()).await.unwrap();
        assert!(position.is_none());
    }

    #[tokio::test]
    async fn test_friends_view_ranks_subset() {
        let db = MemoryDb::new();
        let svc = service(&db);
        for user in ["me", "f1", "f2", "stranger"] {
            seed_user(&db, user).await;
        }
        seed_completion(&db, "stranger", at(15, 8), 500).await;
        seed_completion(&db, "me", at(15, 8), 40).await;
        seed_completion(&db, "f1", at(15, 8), 20).await;
        for user in ["stranger", "me", "f1"] {
            svc.update_weekly(user, monday()).await.unwrap();
        }
        for friend in ["f1", "f2"] {
            db.insert_friendships(&Friendship::accepted_pair("me", friend, at(1, 0)))
                .await
                .unwrap();
        }

        let standings = svc.friends_leaderboard("me", monday()).await.unwrap();

        // f2 has no entry this week
        assert_eq!(standings.len(), 2);
        assert_eq!(standings[0].user_id, "me");
        assert_eq!(standings[0].friend_rank, 1);
        assert_eq!(standings[0].rank, 2);
        assert!(standings[0].is_current_user);
        assert_eq!(standings[1].friend_rank, 2);
    }
}
