// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Set FIRESTORE_EMULATOR_HOST to the running emulator before `cargo test`.
//!
//! The emulator keeps state across tests, so every test uses unique IDs.

use chrono::{Duration, TimeZone, Utc};
use fitboard::db::Store;
use fitboard::error::AppError;
use fitboard::models::{
    Achievement, ChallengeCompletion, ExerciseRecord, ExerciseType, Friendship, LeaderboardEntry,
    User, WeeklyTotals,
};

mod common;
use common::test_db;

/// Generate a unique ID for test isolation.
fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn test_user(id: &str) -> User {
    User::new(
        id,
        &format!("{}@example.com", id),
        "Test User",
        None,
        Utc::now(),
    )
}

fn exercise(user_id: &str, at: chrono::DateTime<Utc>, minutes: u32) -> ExerciseRecord {
    ExerciseRecord {
        id: unique_id("exercise"),
        user_id: user_id.to_string(),
        name: "Run".to_string(),
        exercise_type: ExerciseType::Cardio,
        duration_minutes: minutes,
        reps: None,
        sets: None,
        weight_kg: None,
        calories: Some(250),
        notes: None,
        completed_at: at,
        date: at.format("%Y-%m-%d").to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_create_and_lookup() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");

    assert!(db.get_user(&id).await.unwrap().is_none());

    db.create_user(&test_user(&id)).await.unwrap();

    let fetched = db.get_user(&id).await.unwrap().unwrap();
    assert_eq!(fetched.email, format!("{}@example.com", id));
    assert_eq!(fetched.level, 1);

    let by_email = db
        .find_user_by_email(&format!("{}@example.com", id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, id);
}

#[tokio::test]
async fn test_user_create_twice_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");

    db.create_user(&test_user(&id)).await.unwrap();
    let err = db.create_user(&test_user(&id)).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_update_user_applies_in_place() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");
    db.create_user(&test_user(&id)).await.unwrap();

    let updated = db
        .update_user(&id, &|user: &mut User| user.add_points(150))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.total_points, 150);
    assert_eq!(updated.level, 2);

    let fetched = db.get_user(&id).await.unwrap().unwrap();
    assert_eq!(fetched.total_points, 150);

    let missing = db
        .update_user(&unique_id("ghost"), &|user: &mut User| user.add_points(1))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_concurrent_user_updates_are_not_lost() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");
    db.create_user(&test_user(&id)).await.unwrap();

    let credits = [25u32, 30, 5, 40, 15];
    let mut handles = Vec::new();
    for points in credits {
        let db = db.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            db.update_user(&id, &|user: &mut User| user.add_points(points))
                .await
        }));
    }
    for handle in handles {
        handle
            .await
            .expect("Task join failed")
            .expect("User update failed")
            .expect("User should exist");
    }

    let fetched = db.get_user(&id).await.unwrap().unwrap();
    assert_eq!(fetched.total_points, credits.iter().sum::<u32>());
    assert_eq!(fetched.level, 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// RECORD TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_exercise_scans_by_date_and_recency() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let monday = Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();

    db.insert_exercise(&exercise(&user_id, monday, 30))
        .await
        .unwrap();
    db.insert_exercise(&exercise(&user_id, monday + Duration::days(2), 45))
        .await
        .unwrap();
    db.insert_exercise(&exercise(&user_id, monday + Duration::days(8), 20))
        .await
        .unwrap();

    let on_monday = db.exercises_on_date(&user_id, "2026-10-19").await.unwrap();
    assert_eq!(on_monday.len(), 1);

    let week = db
        .exercises_between_dates(&user_id, "2026-10-19", "2026-10-25")
        .await
        .unwrap();
    assert_eq!(week.len(), 2);

    let recent = db.recent_exercises(&user_id, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].duration_minutes, 20);
    assert_eq!(recent[1].duration_minutes, 45);
}

#[tokio::test]
async fn test_completion_insert_is_conditional() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let completion = ChallengeCompletion {
        id: ChallengeCompletion::key(&user_id, "challenge-1", "2026-10-19"),
        user_id: user_id.clone(),
        challenge_id: "challenge-1".to_string(),
        actual_value: 20.0,
        points_earned: 15,
        completed_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
        date: "2026-10-19".to_string(),
    };

    db.insert_completion(&completion).await.unwrap();
    let err = db.insert_completion(&completion).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    let found = db
        .find_completion(&user_id, "challenge-1", "2026-10-19")
        .await
        .unwrap();
    assert_eq!(found, Some(completion));
}

#[tokio::test]
async fn test_achievement_insert_is_conditional() {
    require_emulator!();

    let db = test_db().await;
    let user_id = unique_id("user");
    let achievement = Achievement::unlock(
        &user_id,
        &fitboard::models::achievement::WEEK_WARRIOR,
        Utc::now(),
    );

    db.insert_achievement(&achievement).await.unwrap();
    assert!(db.insert_achievement(&achievement).await.is_err());
    assert_eq!(db.achievements_for_user(&user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_friendship_pair_written_together() {
    require_emulator!();

    let db = test_db().await;
    let a = unique_id("a");
    let b = unique_id("b");

    db.insert_friendships(&Friendship::accepted_pair(&a, &b, Utc::now()))
        .await
        .unwrap();

    assert!(db.find_friendship(&a, &b).await.unwrap().is_some());
    assert!(db.find_friendship(&b, &a).await.unwrap().is_some());
    assert_eq!(db.friendships_for_user(&b).await.unwrap().len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// LEADERBOARD TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_upsert_totals_keeps_rank() {
    require_emulator!();

    let db = test_db().await;
    let week = "2026-10-19";
    let user_id = unique_id("user");

    let created = db
        .upsert_leaderboard_totals(
            &user_id,
            week,
            WeeklyTotals {
                workouts: 1,
                points: 10,
                minutes: 30,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.rank, 0);

    let mut ranked = created.clone();
    ranked.rank = 7;
    db.set_leaderboard_ranks(&[ranked]).await.unwrap();

    let patched = db
        .upsert_leaderboard_totals(
            &user_id,
            week,
            WeeklyTotals {
                workouts: 2,
                points: 25,
                minutes: 60,
            },
        )
        .await
        .unwrap();
    assert_eq!(patched.rank, 7);
    assert_eq!(patched.weekly_points, 25);

    let stored = db.get_leaderboard_entry(&user_id, week).await.unwrap().unwrap();
    assert_eq!(stored.rank, 7);
    assert_eq!(stored.weekly_workouts, 2);
}

#[tokio::test]
async fn test_rank_batches_and_top_view() {
    require_emulator!();

    let db = test_db().await;
    // A week key nobody else writes to
    let week = format!("2000-{}", unique_id("w"));

    let mut entries = Vec::new();
    for i in 0..5u32 {
        let entry = db
            .upsert_leaderboard_totals(
                &format!("user-{}", i),
                &week,
                WeeklyTotals {
                    workouts: 1,
                    points: i * 10,
                    minutes: 30,
                },
            )
            .await
            .unwrap();
        entries.push(entry);
    }

    // Unranked entries are not in the top view yet.
    assert!(db.leaderboard_top(&week, 10).await.unwrap().is_empty());

    let changed = fitboard::models::leaderboard::rank_entries(&mut entries);
    assert_eq!(changed.len(), 5);
    db.set_leaderboard_ranks(&changed).await.unwrap();

    let top: Vec<LeaderboardEntry> = db.leaderboard_top(&week, 3).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].user_id, "user-4");
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[2].rank, 3);

    assert_eq!(db.leaderboard_for_week(&week).await.unwrap().len(), 5);
}
