// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Daily challenges: catalog, completion scoring and the Week Warrior badge.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::achievement::{WEEK_WARRIOR, WEEK_WARRIOR_DAYS};
use crate::models::{Challenge, ChallengeCompletion, ChallengeType, Difficulty, User};
use crate::services::{AchievementService, LeaderboardService};
use crate::time_utils::{format_date_key, parse_date_key, Calendar};

/// Number of days covered by a seed run, starting today.
pub const SEED_DAYS: i64 = 7;

/// Challenge definition supplied by an administrator.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub description: String,
    pub challenge_type: ChallengeType,
    pub target: f64,
    pub points: u32,
    pub difficulty: Difficulty,
    /// Defaults to today
    pub date: Option<String>,
}

struct SeedTemplate {
    title: &'static str,
    description: &'static str,
    challenge_type: ChallengeType,
    target: f64,
    points: u32,
    difficulty: Difficulty,
}

const SEED_TEMPLATES: [SeedTemplate; 3] = [
    SeedTemplate {
        title: "Morning Energizer",
        description: "Complete 20 jumping jacks to start your day",
        challenge_type: ChallengeType::Reps,
        target: 20.0,
        points: 15,
        difficulty: Difficulty::Beginner,
    },
    SeedTemplate {
        title: "Core Crusher",
        description: "Hold a plank for 60 seconds",
        challenge_type: ChallengeType::Duration,
        target: 60.0,
        points: 25,
        difficulty: Difficulty::Intermediate,
    },
    SeedTemplate {
        title: "Step Master",
        description: "Take 8,000 steps today",
        challenge_type: ChallengeType::Steps,
        target: 8000.0,
        points: 30,
        difficulty: Difficulty::Beginner,
    },
];

#[derive(Clone)]
pub struct ChallengeService {
    db: Arc<dyn Store>,
    calendar: Calendar,
    achievements: AchievementService,
    leaderboard: LeaderboardService,
}

impl ChallengeService {
    pub fn new(
        db: Arc<dyn Store>,
        calendar: Calendar,
        achievements: AchievementService,
        leaderboard: LeaderboardService,
    ) -> Self {
        Self {
            db,
            calendar,
            achievements,
            leaderboard,
        }
    }

    // ─── Catalog ─────────────────────────────────────────────────

    /// Active challenges dated today.
    pub async fn todays_challenges(&self) -> Result<Vec<Challenge>> {
        self.active_challenges_on(&self.calendar.date_key(Utc::now()))
            .await
    }

    pub async fn active_challenges_on(&self, date: &str) -> Result<Vec<Challenge>> {
        let mut challenges = self.db.challenges_on_date(date).await?;
        challenges.retain(|c| c.is_active);
        Ok(challenges)
    }

    /// The caller's completions dated today.
    pub async fn completions_today(&self, user_id: &str) -> Result<Vec<ChallengeCompletion>> {
        self.db
            .completions_on_date(user_id, &self.calendar.date_key(Utc::now()))
            .await
    }

    pub async fn create_challenge(&self, new: NewChallenge) -> Result<Challenge> {
        if new.target.is_nan() || new.target <= 0.0 {
            return Err(AppError::BadRequest(
                "Challenge target must be positive".to_string(),
            ));
        }
        let date = match new.date {
            Some(raw) => format_date_key(parse_date_key(&raw)?),
            None => self.calendar.date_key(Utc::now()),
        };

        let challenge = Challenge {
            id: uuid::Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            challenge_type: new.challenge_type,
            target: new.target,
            points: new.points,
            difficulty: new.difficulty,
            date,
            is_active: true,
        };
        self.db.insert_challenge(&challenge).await?;

        tracing::info!(
            challenge_id = %challenge.id,
            date = %challenge.date,
            "Created daily challenge"
        );
        Ok(challenge)
    }

    /// One challenge per day for the next week, rotating through the
    /// built-in templates.
    pub async fn seed_daily_challenges(&self) -> Result<Vec<Challenge>> {
        self.seed_daily_challenges_at(Utc::now()).await
    }

    pub async fn seed_daily_challenges_at(&self, now: DateTime<Utc>) -> Result<Vec<Challenge>> {
        let today = self.calendar.local_date(now);
        let mut seeded = Vec::with_capacity(SEED_DAYS as usize);

        for offset in 0..SEED_DAYS {
            let template = &SEED_TEMPLATES[offset as usize % SEED_TEMPLATES.len()];
            let challenge = Challenge {
                id: uuid::Uuid::new_v4().to_string(),
                title: template.title.to_string(),
                description: template.description.to_string(),
                challenge_type: template.challenge_type,
                target: template.target,
                points: template.points,
                difficulty: template.difficulty,
                date: format_date_key(today + Duration::days(offset)),
                is_active: true,
            };
            self.db.insert_challenge(&challenge).await?;
            seeded.push(challenge);
        }

        tracing::info!(count = seeded.len(), "Seeded daily challenges");
        Ok(seeded)
    }

    // ─── Completion ──────────────────────────────────────────────

    pub async fn complete_challenge(
        &self,
        user_id: &str,
        challenge_id: &str,
        actual_value: f64,
    ) -> Result<ChallengeCompletion> {
        self.complete_challenge_at(user_id, challenge_id, actual_value, Utc::now())
            .await
    }

    /// Record a completion, credit its points and check the Week Warrior
    /// badge.
    ///
    /// Fails with NotFound for an unknown challenge and Conflict if the user
    /// already completed it today. A rejected call writes nothing.
    pub async fn complete_challenge_at(
        &self,
        user_id: &str,
        challenge_id: &str,
        actual_value: f64,
        now: DateTime<Utc>,
    ) -> Result<ChallengeCompletion> {
        let challenge = self
            .db
            .get_challenge(challenge_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Challenge {}", challenge_id)))?;

        let today = self.calendar.date_key(now);
        if self
            .db
            .find_completion(user_id, challenge_id, &today)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Challenge already completed today".to_string(),
            ));
        }

        let points_earned = challenge.points_for(actual_value);
        let completion = ChallengeCompletion {
            id: ChallengeCompletion::key(user_id, challenge_id, &today),
            user_id: user_id.to_string(),
            challenge_id: challenge_id.to_string(),
            actual_value,
            points_earned,
            completed_at: now,
            date: today,
        };
        // Keyed insert: a concurrent duplicate fails here with Conflict.
        self.db.insert_completion(&completion).await?;

        tracing::info!(
            user_id,
            challenge_id,
            actual_value,
            points_earned,
            "Challenge completed"
        );

        if self
            .db
            .update_user(user_id, &|user: &mut User| user.add_points(points_earned))
            .await?
            .is_some()
        {
            self.check_week_warrior(user_id, now).await?;
        }

        if let Err(e) = self.leaderboard.update_for_event(user_id, now).await {
            tracing::warn!(user_id, error = %e, "Leaderboard update after completion failed");
        }

        Ok(completion)
    }

    /// Distinct days on which the user completed any challenge.
    pub async fn challenge_streak(&self, user_id: &str) -> Result<usize> {
        let days: HashSet<String> = self
            .db
            .completions_for_user(user_id)
            .await?
            .into_iter()
            .map(|c| c.date)
            .collect();
        Ok(days.len())
    }

    async fn check_week_warrior(&self, user_id: &str, now: DateTime<Utc>) -> Result<()> {
        if self.challenge_streak(user_id).await? == WEEK_WARRIOR_DAYS {
            self.achievements
                .award_once(user_id, &WEEK_WARRIOR, now)
                .await?;
        }
        Ok(())
    }
}
