// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress analytics over a user's exercise log.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;

use crate::db::Store;
use crate::error::Result;
use crate::models::progress::{DailyProgress, ProgressTrends, WeeklyProgress};
use crate::time_utils::{format_date_key, Calendar};

/// Length of the trends window.
pub const TREND_DAYS: i64 = 30;

#[derive(Clone)]
pub struct ProgressService {
    db: Arc<dyn Store>,
    calendar: Calendar,
}

impl ProgressService {
    pub fn new(db: Arc<dyn Store>, calendar: Calendar) -> Self {
        Self { db, calendar }
    }

    pub async fn daily(&self, user_id: &str, date: NaiveDate) -> Result<DailyProgress> {
        let records = self
            .db
            .exercises_on_date(user_id, &format_date_key(date))
            .await?;
        Ok(DailyProgress::from_records(records))
    }

    pub async fn weekly(&self, user_id: &str, week_start: NaiveDate) -> Result<WeeklyProgress> {
        let last_day = week_start + Duration::days(6);
        let records = self
            .db
            .exercises_between_dates(
                user_id,
                &format_date_key(week_start),
                &format_date_key(last_day),
            )
            .await?;
        Ok(WeeklyProgress::from_records(week_start, &records))
    }

    pub async fn trends(&self, user_id: &str) -> Result<ProgressTrends> {
        self.trends_at(user_id, Utc::now()).await
    }

    /// Records completed in the trailing window ending at `now`.
    pub async fn trends_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<ProgressTrends> {
        let since = now - Duration::days(TREND_DAYS);
        let records: Vec<_> = self
            .db
            .exercises_between_dates(
                user_id,
                &self.calendar.date_key(since),
                &self.calendar.date_key(now),
            )
            .await?
            .into_iter()
            .filter(|r| r.completed_at >= since)
            .collect();
        Ok(ProgressTrends::from_records(records))
    }
}
