// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod achievements;
pub mod catalog;
pub mod challenges;
pub mod exercise;
pub mod friends;
pub mod leaderboard;
pub mod progress;
pub mod users;

pub use achievements::AchievementService;
pub use catalog::{CatalogService, NewCatalogExercise};
pub use challenges::{ChallengeService, NewChallenge};
pub use exercise::{ExerciseService, NewExercise};
pub use friends::{FriendProfile, FriendService};
pub use leaderboard::LeaderboardService;
pub use progress::ProgressService;
pub use users::{IdentityProfile, UserService};
