// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profiles: first-contact sync and dashboard stats.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::user::normalize_email;
use crate::models::User;
use crate::time_utils::{format_date_key, Calendar};

/// Profile fields supplied by the identity provider.
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub email: String,
    pub name: String,
    pub image: Option<String>,
}

/// Dashboard stats: the profile plus today's and this week's activity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub user: User,
    pub today_workouts: u32,
    pub weekly_workouts: u32,
    pub weekly_minutes: u32,
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<dyn Store>,
    calendar: Calendar,
}

impl UserService {
    pub fn new(db: Arc<dyn Store>, calendar: Calendar) -> Self {
        Self { db, calendar }
    }

    /// Look up the user for an identity subject, creating it on first contact.
    /// An existing user gets its email, name and image refreshed.
    pub async fn sync_user(&self, subject: &str, profile: IdentityProfile) -> Result<User> {
        self.sync_user_at(subject, profile, Utc::now()).await
    }

    pub async fn sync_user_at(
        &self,
        subject: &str,
        profile: IdentityProfile,
        now: DateTime<Utc>,
    ) -> Result<User> {
        let email = normalize_email(&profile.email);
        let refresh = |user: &mut User| {
            user.email = email.clone();
            user.name = profile.name.clone();
            user.image = profile.image.clone();
        };

        if let Some(user) = self.db.update_user(subject, &refresh).await? {
            return Ok(user);
        }

        let user = User::new(subject, &email, profile.name.clone(), profile.image.clone(), now);
        match self.db.create_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = subject, "Created user");
                Ok(user)
            }
            // A concurrent first request created it; refresh that one.
            Err(AppError::Conflict(_)) => self
                .db
                .update_user(subject, &refresh)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {}", subject))),
            Err(e) => Err(e),
        }
    }

    /// The caller's user record; fails with NotFound before the first sync.
    pub async fn require_user(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    pub async fn dashboard_stats(&self, user_id: &str) -> Result<DashboardStats> {
        self.dashboard_stats_at(user_id, Utc::now()).await
    }

    pub async fn dashboard_stats_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats> {
        let user = self.require_user(user_id).await?;

        let today = self.calendar.date_key(now);
        let today_workouts = self.db.exercises_on_date(user_id, &today).await?.len() as u32;

        let week_start = self.calendar.week_start(now);
        let (start, _) = self.calendar.week_bounds(week_start);
        let this_week: Vec<_> = self
            .db
            .exercises_between_dates(user_id, &format_date_key(week_start), &today)
            .await?
            .into_iter()
            .filter(|r| r.completed_at >= start)
            .collect();

        Ok(DashboardStats {
            user,
            today_workouts,
            weekly_workouts: this_week.len() as u32,
            weekly_minutes: this_week.iter().map(|r| r.duration_minutes).sum(),
        })
    }
}
