// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and week arithmetic.
//!
//! All calendar keys (`YYYY-MM-DD` day strings and Monday week starts) are
//! computed in one fixed UTC offset so that the day a record is stamped with
//! and the week it is counted in always agree.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc, Weekday,
};

use crate::error::{AppError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Years accepted from callers. Date keys must stay four digits to sort as
/// strings.
const MIN_YEAR: i32 = 1970;
const MAX_YEAR: i32 = 9999;

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date_key(raw: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::BadRequest(format!("Invalid date '{}': expected YYYY-MM-DD", raw))
    })?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
        return Err(AppError::BadRequest(format!(
            "Invalid date '{}': year must be between {} and {}",
            raw, MIN_YEAR, MAX_YEAR
        )));
    }
    Ok(date)
}

/// Parse a week key; it must be a Monday.
pub fn parse_week_start(raw: &str) -> Result<NaiveDate> {
    let date = parse_date_key(raw)?;
    if date.weekday() != Weekday::Mon {
        return Err(AppError::BadRequest(format!(
            "Invalid week start '{}': must be a Monday",
            raw
        )));
    }
    Ok(date)
}

/// Calendar used for day strings and leaderboard week boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Calendar at a fixed offset east of UTC, in minutes.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(|offset| Self { offset })
    }

    /// Local calendar date of an instant.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// `YYYY-MM-DD` of an instant, as stamped on records at write time.
    pub fn date_key(&self, at: DateTime<Utc>) -> String {
        format_date_key(self.local_date(at))
    }

    /// Monday of the week containing the given date.
    pub fn week_start_of(date: NaiveDate) -> NaiveDate {
        date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
    }

    /// Monday of the week containing an instant.
    pub fn week_start(&self, at: DateTime<Utc>) -> NaiveDate {
        Self::week_start_of(self.local_date(at))
    }

    /// Week key (`YYYY-MM-DD` of the Monday) for an instant.
    pub fn week_key(&self, at: DateTime<Utc>) -> String {
        format_date_key(self.week_start(at))
    }

    /// Resolve an optional caller-supplied week key, defaulting to the week of `now`.
    pub fn resolve_week(&self, requested: Option<&str>, now: DateTime<Utc>) -> Result<NaiveDate> {
        match requested {
            Some(raw) => parse_week_start(raw),
            None => Ok(self.week_start(now)),
        }
    }

    /// Start of a local day as a UTC instant.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        let utc = midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        DateTime::from_naive_utc_and_offset(utc, Utc)
    }

    /// Half-open instant range `[Monday 00:00, next Monday 00:00)` of a week.
    pub fn week_bounds(&self, week_start: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.start_of_day(week_start);
        (start, start + Duration::days(7))
    }
}

/// The seven dates of a week, Monday first.
pub fn week_days(week_start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    (0..7).map(move |i| week_start + Duration::days(i))
}
