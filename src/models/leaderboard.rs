// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly leaderboard entries and the ranking order.
//!
//! Entries are recomputed from source records rather than patched
//! incrementally, so re-running an aggregation never drifts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{ChallengeCompletion, ExerciseRecord};

/// One user's standing in one week. Stored at `leaderboards/{user}_{week}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    /// Entry key, see [`LeaderboardEntry::key`]
    pub id: String,
    /// Monday of the week (`YYYY-MM-DD`)
    pub week_start: String,
    pub user_id: String,
    pub weekly_workouts: u32,
    pub weekly_points: u32,
    pub weekly_minutes: u32,
    /// 1-based position after the last re-rank; 0 until first ranked
    #[serde(default)]
    pub rank: u32,
}

impl LeaderboardEntry {
    pub fn key(user_id: &str, week_start: &str) -> String {
        format!("{}_{}", super::key_segment(user_id), week_start)
    }

    /// New, not yet ranked entry.
    pub fn unranked(user_id: &str, week_start: &str, totals: WeeklyTotals) -> Self {
        Self {
            id: Self::key(user_id, week_start),
            week_start: week_start.to_string(),
            user_id: user_id.to_string(),
            weekly_workouts: totals.workouts,
            weekly_points: totals.points,
            weekly_minutes: totals.minutes,
            rank: 0,
        }
    }

    pub fn totals(&self) -> WeeklyTotals {
        WeeklyTotals {
            workouts: self.weekly_workouts,
            points: self.weekly_points,
            minutes: self.weekly_minutes,
        }
    }

    pub fn apply_totals(&mut self, totals: WeeklyTotals) {
        self.weekly_workouts = totals.workouts;
        self.weekly_points = totals.points;
        self.weekly_minutes = totals.minutes;
    }
}

/// Aggregates for one user over one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyTotals {
    pub workouts: u32,
    pub points: u32,
    pub minutes: u32,
}

impl WeeklyTotals {
    /// Sum the records whose timestamps fall in `[start, end)`.
    pub fn from_records(
        exercises: &[ExerciseRecord],
        completions: &[ChallengeCompletion],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let in_week = |at: &DateTime<Utc>| *at >= start && *at < end;

        let mut totals = WeeklyTotals::default();
        for exercise in exercises.iter().filter(|e| in_week(&e.completed_at)) {
            totals.workouts += 1;
            totals.minutes = totals.minutes.saturating_add(exercise.duration_minutes);
        }
        totals.points = completions
            .iter()
            .filter(|c| in_week(&c.completed_at))
            .fold(0u32, |sum, c| sum.saturating_add(c.points_earned));
        totals
    }
}

/// Global leaderboard order: points, then workouts, then minutes, all
/// descending. User ID breaks complete ties so the order is total.
pub fn compare_standing(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.weekly_points
        .cmp(&a.weekly_points)
        .then_with(|| b.weekly_workouts.cmp(&a.weekly_workouts))
        .then_with(|| b.weekly_minutes.cmp(&a.weekly_minutes))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sort a week's entries and assign 1-based ranks.
///
/// Returns the entries whose rank changed, which are the only ones that
/// need to be written back.
pub fn rank_entries(entries: &mut [LeaderboardEntry]) -> Vec<LeaderboardEntry> {
    entries.sort_by(compare_standing);

    let mut changed = Vec::new();
    for (index, entry) in entries.iter_mut().enumerate() {
        let rank = index as u32 + 1;
        if entry.rank != rank {
            entry.rank = rank;
            changed.push(entry.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseType;

    fn entry(user: &str, points: u32, workouts: u32, minutes: u32) -> LeaderboardEntry {
        LeaderboardEntry::unranked(
            user,
            "2024-01-15",
            WeeklyTotals {
                workouts,
                points,
                minutes,
            },
        )
    }

    fn ranks_by_user(entries: &[LeaderboardEntry]) -> Vec<(String, u32)> {
        let mut ranks: Vec<(String, u32)> = entries
            .iter()
            .map(|e| (e.user_id.clone(), e.rank))
            .collect();
        ranks.sort();
        ranks
    }

    #[test]
    fn test_points_tie_broken_by_workouts() {
        let mut entries = vec![
            entry("a", 300, 5, 0),
            entry("b", 300, 3, 0),
            entry("c", 200, 10, 0),
        ];
        rank_entries(&mut entries);

        assert_eq!(
            ranks_by_user(&entries),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_minutes_break_workout_ties() {
        let mut entries = vec![entry("a", 100, 4, 30), entry("b", 100, 4, 90)];
        rank_entries(&mut entries);
        assert_eq!(entries[0].user_id, "b");
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].rank, 2);
    }

    #[test]
    fn test_rerank_is_idempotent() {
        let mut entries = vec![
            entry("d", 50, 1, 10),
            entry("a", 50, 1, 10),
            entry("c", 120, 2, 45),
            entry("b", 0, 0, 0),
        ];
        let first_changes = rank_entries(&mut entries);
        assert_eq!(first_changes.len(), 4);
        let first = ranks_by_user(&entries);

        // Same rows, different scan order
        entries.reverse();
        let second_changes = rank_entries(&mut entries);

        assert!(second_changes.is_empty());
        assert_eq!(ranks_by_user(&entries), first);
    }

    #[test]
    fn test_only_changed_ranks_are_reported() {
        let mut entries = vec![entry("a", 10, 1, 1), entry("b", 5, 1, 1)];
        rank_entries(&mut entries);

        entries[1].weekly_points = 20;
        let changed = rank_entries(&mut entries);
        assert_eq!(changed.len(), 2);
        assert_eq!(entries[0].user_id, "b");
    }

    #[test]
    fn test_weekly_totals_respect_bounds() {
        let start = DateTime::parse_from_rfc3339("2024-01-15T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let end = start + chrono::Duration::days(7);

        let exercise = |at: DateTime<Utc>, minutes: u32| ExerciseRecord {
            id: at.to_rfc3339(),
            user_id: "a".to_string(),
            name: "Run".to_string(),
            exercise_type: ExerciseType::Cardio,
            duration_minutes: minutes,
            reps: None,
            sets: None,
            weight_kg: None,
            calories: None,
            notes: None,
            completed_at: at,
            date: String::new(),
        };
        let completion = |at: DateTime<Utc>, points: u32| ChallengeCompletion {
            id: at.to_rfc3339(),
            user_id: "a".to_string(),
            challenge_id: "c".to_string(),
            actual_value: 1.0,
            points_earned: points,
            completed_at: at,
            date: String::new(),
        };

        let exercises = vec![
            exercise(start, 30),
            exercise(end - chrono::Duration::seconds(1), 20),
            exercise(end, 100),
            exercise(start - chrono::Duration::seconds(1), 100),
        ];
        let completions = vec![completion(start, 15), completion(end, 40)];

        let totals = WeeklyTotals::from_records(&exercises, &completions, start, end);
        assert_eq!(
            totals,
            WeeklyTotals {
                workouts: 2,
                points: 15,
                minutes: 50
            }
        );
    }
}
