// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitboard: workout logging, daily challenges and weekly leaderboards
//!
//! This crate provides the backend API for a fitness tracker. Users log
//! exercises and complete daily challenges; a weekly leaderboard ranks
//! them globally and among friends.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Store;
use services::{
    AchievementService, CatalogService, ChallengeService, ExerciseService, FriendService,
    LeaderboardService, ProgressService, UserService,
};
use std::sync::Arc;
use time_utils::Calendar;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Store>,
    pub calendar: Calendar,
    pub users: UserService,
    pub exercises: ExerciseService,
    pub catalog: CatalogService,
    pub challenges: ChallengeService,
    pub achievements: AchievementService,
    pub friends: FriendService,
    pub progress: ProgressService,
    pub leaderboard: LeaderboardService,
}

impl AppState {
    /// Wire the services on top of a store.
    pub fn new(config: Config, db: Arc<dyn Store>) -> anyhow::Result<Self> {
        let calendar = Calendar::from_offset_minutes(config.utc_offset_minutes).ok_or_else(|| {
            anyhow::anyhow!("Invalid UTC offset: {} minutes", config.utc_offset_minutes)
        })?;

        let leaderboard = LeaderboardService::new(db.clone(), calendar);
        let achievements = AchievementService::new(db.clone());

        Ok(Self {
            users: UserService::new(db.clone(), calendar),
            exercises: ExerciseService::new(db.clone(), calendar, leaderboard.clone()),
            catalog: CatalogService::new(db.clone()),
            challenges: ChallengeService::new(
                db.clone(),
                calendar,
                achievements.clone(),
                leaderboard.clone(),
            ),
            friends: FriendService::new(db.clone()),
            progress: ProgressService::new(db.clone(), calendar),
            achievements,
            leaderboard,
            calendar,
            config,
            db,
        })
    }
}
