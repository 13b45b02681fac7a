// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store for local development and tests.
//!
//! Each collection is a `DashMap` keyed by document ID. A single-document
//! write holds that document's shard lock, which gives the same per-document
//! atomicity the managed store provides.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::db::{already_exists, Store, UserUpdate};
use crate::error::Result;
use crate::models::{
    Achievement, CatalogExercise, Challenge, ChallengeCompletion, ExerciseRecord, ExerciseType,
    Friendship, LeaderboardEntry, User, WeeklyTotals,
};

#[derive(Default)]
struct Collections {
    users: DashMap<String, User>,
    exercises: DashMap<String, ExerciseRecord>,
    catalog: DashMap<String, CatalogExercise>,
    challenges: DashMap<String, Challenge>,
    completions: DashMap<String, ChallengeCompletion>,
    achievements: DashMap<String, Achievement>,
    friendships: DashMap<String, Friendship>,
    leaderboards: DashMap<String, LeaderboardEntry>,
}

/// In-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<Collections>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Clone every value matching `keep`.
fn scan<T: Clone>(map: &DashMap<String, T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    map.iter()
        .filter(|item| keep(item.value()))
        .map(|item| item.value().clone())
        .collect()
}

/// Insert unless the key is taken.
fn insert_new<T: Clone>(map: &DashMap<String, T>, what: &str, key: &str, value: &T) -> Result<()> {
    match map.entry(key.to_string()) {
        Entry::Occupied(_) => Err(already_exists(what, key)),
        Entry::Vacant(slot) => {
            slot.insert(value.clone());
            Ok(())
        }
    }
}

fn in_date_range(date: &str, from_date: &str, to_date: &str) -> bool {
    date >= from_date && date <= to_date
}

#[async_trait]
impl Store for MemoryDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        Ok(self.inner.users.get(user_id).map(|u| u.value().clone()))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(scan(&self.inner.users, |u| u.email == email).into_iter().next())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        insert_new(&self.inner.users, "User", &user.id, user)
    }

    async fn update_user(&self, user_id: &str, update: UserUpdate<'_>) -> Result<Option<User>> {
        Ok(self.inner.users.get_mut(user_id).map(|mut user| {
            update(user.value_mut());
            user.value().clone()
        }))
    }

    // ─── Exercise Log ────────────────────────────────────────────

    async fn insert_exercise(&self, record: &ExerciseRecord) -> Result<()> {
        insert_new(&self.inner.exercises, "Exercise", &record.id, record)
    }

    async fn exercises_on_date(&self, user_id: &str, date: &str) -> Result<Vec<ExerciseRecord>> {
        Ok(scan(&self.inner.exercises, |e| {
            e.user_id == user_id && e.date == date
        }))
    }

    async fn exercises_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ExerciseRecord>> {
        Ok(scan(&self.inner.exercises, |e| {
            e.user_id == user_id && in_date_range(&e.date, from_date, to_date)
        }))
    }

    async fn recent_exercises(&self, user_id: &str, limit: u32) -> Result<Vec<ExerciseRecord>> {
        let mut records = scan(&self.inner.exercises, |e| e.user_id == user_id);
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        records.truncate(limit as usize);
        Ok(records)
    }

    // ─── Exercise Catalog ────────────────────────────────────────

    async fn get_catalog_exercise(&self, key: &str) -> Result<Option<CatalogExercise>> {
        Ok(self.inner.catalog.get(key).map(|e| e.value().clone()))
    }

    async fn insert_catalog_exercise(&self, exercise: &CatalogExercise) -> Result<()> {
        insert_new(&self.inner.catalog, "Exercise", &exercise.id, exercise)
    }

    async fn catalog_exercises(
        &self,
        category: Option<ExerciseType>,
    ) -> Result<Vec<CatalogExercise>> {
        Ok(scan(&self.inner.catalog, |e| {
            category.is_none_or(|c| e.category == c)
        }))
    }

    // ─── Challenges ──────────────────────────────────────────────

    async fn get_challenge(&self, challenge_id: &str) -> Result<Option<Challenge>> {
        Ok(self
            .inner
            .challenges
            .get(challenge_id)
            .map(|c| c.value().clone()))
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<()> {
        insert_new(&self.inner.challenges, "Challenge", &challenge.id, challenge)
    }

    async fn challenges_on_date(&self, date: &str) -> Result<Vec<Challenge>> {
        Ok(scan(&self.inner.challenges, |c| c.date == date))
    }

    async fn find_completion(
        &self,
        user_id: &str,
        challenge_id: &str,
        date: &str,
    ) -> Result<Option<ChallengeCompletion>> {
        let key = ChallengeCompletion::key(user_id, challenge_id, date);
        Ok(self.inner.completions.get(&key).map(|c| c.value().clone()))
    }

    async fn insert_completion(&self, completion: &ChallengeCompletion) -> Result<()> {
        insert_new(
            &self.inner.completions,
            "Challenge completion",
            &completion.id,
            completion,
        )
    }

    async fn completions_for_user(&self, user_id: &str) -> Result<Vec<ChallengeCompletion>> {
        Ok(scan(&self.inner.completions, |c| c.user_id == user_id))
    }

    async fn completions_on_date(
        &self,
        user_id: &str,
        date: &str,
    ) -> Result<Vec<ChallengeCompletion>> {
        Ok(scan(&self.inner.completions, |c| {
            c.user_id == user_id && c.date == date
        }))
    }

    async fn completions_between_dates(
        &self,
        user_id: &str,
        from_date: &str,
        to_date: &str,
    ) -> Result<Vec<ChallengeCompletion>> {
        Ok(scan(&self.inner.completions, |c| {
            c.user_id == user_id && in_date_range(&c.date, from_date, to_date)
        }))
    }

    // ─── Achievements ────────────────────────────────────────────

    async fn find_achievement(&self, user_id: &str, kind: &str) -> Result<Option<Achievement>> {
        let key = Achievement::key(user_id, kind);
        Ok(self.inner.achievements.get(&key).map(|a| a.value().clone()))
    }

    async fn insert_achievement(&self, achievement: &Achievement) -> Result<()> {
        insert_new(
            &self.inner.achievements,
            "Achievement",
            &achievement.id,
            achievement,
        )
    }

    async fn achievements_for_user(&self, user_id: &str) -> Result<Vec<Achievement>> {
        let mut achievements = scan(&self.inner.achievements, |a| a.user_id == user_id);
        achievements.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
        Ok(achievements)
    }

    async fn all_achievements(&self) -> Result<Vec<Achievement>> {
        Ok(scan(&self.inner.achievements, |_| true))
    }

    // ─── Friendships ─────────────────────────────────────────────

    async fn find_friendship(&self, user_id: &str, friend_id: &str) -> Result<Option<Friendship>> {
        let key = Friendship::key(user_id, friend_id);
        Ok(self.inner.friendships.get(&key).map(|f| f.value().clone()))
    }

    async fn insert_friendships(&self, edges: &[Friendship]) -> Result<()> {
        for edge in edges {
            self.inner.friendships.insert(edge.id.clone(), edge.clone());
        }
        Ok(())
    }

    async fn friendships_for_user(&self, user_id: &str) -> Result<Vec<Friendship>> {
        Ok(scan(&self.inner.friendships, |f| f.user_id == user_id))
    }

    // ─── Leaderboard ─────────────────────────────────────────────

    async fn get_leaderboard_entry(
        &self,
        user_id: &str,
        week_start: &str,
    ) -> Result<Option<LeaderboardEntry>> {
        let key = LeaderboardEntry::key(user_id, week_start);
        Ok(self.inner.leaderboards.get(&key).map(|e| e.value().clone()))
    }

    async fn upsert_leaderboard_totals(
        &self,
        user_id: &str,
        week_start: &str,
        totals: WeeklyTotals,
    ) -> Result<LeaderboardEntry> {
        let key = LeaderboardEntry::key(user_id, week_start);
        let entry = match self.inner.leaderboards.entry(key) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().apply_totals(totals);
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot
                .insert(LeaderboardEntry::unranked(user_id, week_start, totals))
                .value()
                .clone(),
        };
        Ok(entry)
    }

    async fn leaderboard_for_week(&self, week_start: &str) -> Result<Vec<LeaderboardEntry>> {
        Ok(scan(&self.inner.leaderboards, |e| e.week_start == week_start))
    }

    async fn leaderboard_top(
        &self,
        week_start: &str,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut entries = scan(&self.inner.leaderboards, |e| {
            e.week_start == week_start && e.rank > 0
        });
        entries.sort_by_key(|e| e.rank);
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn set_leaderboard_ranks(&self, entries: &[LeaderboardEntry]) -> Result<()> {
        for ranked in entries {
            if let Some(mut stored) = self.inner.leaderboards.get_mut(&ranked.id) {
                stored.rank = ranked.rank;
            }
        }
        Ok(())
    }
}
