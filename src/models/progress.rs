// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progress analytics computed from exercise records.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{ExerciseRecord, ExerciseType};
use crate::time_utils::{format_date_key, week_days};

/// Number of recent records included in trends.
pub const RECENT_EXERCISES: usize = 10;

fn total_duration(records: &[&ExerciseRecord]) -> u32 {
    records
        .iter()
        .fold(0u32, |sum, r| sum.saturating_add(r.duration_minutes))
}

fn total_calories(records: &[&ExerciseRecord]) -> u32 {
    records
        .iter()
        .filter_map(|r| r.calories)
        .fold(0u32, |sum, c| sum.saturating_add(c))
}

/// Totals for a single day.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyProgress {
    pub exercises: Vec<ExerciseRecord>,
    pub total_duration: u32,
    pub total_calories: u32,
    pub exercise_count: u32,
    /// Distinct types, in order of first appearance
    pub exercise_types: Vec<ExerciseType>,
}

impl DailyProgress {
    pub fn from_records(exercises: Vec<ExerciseRecord>) -> Self {
        let refs: Vec<&ExerciseRecord> = exercises.iter().collect();
        let total_duration = total_duration(&refs);
        let total_calories = total_calories(&refs);

        let mut exercise_types = Vec::new();
        for record in &exercises {
            if !exercise_types.contains(&record.exercise_type) {
                exercise_types.push(record.exercise_type);
            }
        }

        Self {
            exercise_count: exercises.len() as u32,
            exercises,
            total_duration,
            total_calories,
            exercise_types,
        }
    }
}

/// One day of the weekly breakdown.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayStats {
    pub date: String,
    /// Short weekday name ("Mon")
    pub day_name: String,
    pub exercises: u32,
    pub duration: u32,
    pub calories: u32,
}

/// Per-day breakdown of one week plus totals.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyProgress {
    pub daily_stats: Vec<DayStats>,
    pub total_workouts: u32,
    pub total_duration: u32,
    pub total_calories: u32,
    pub average_workout_duration: u32,
}

impl WeeklyProgress {
    /// Group records by their stamped day. Records outside the week are ignored.
    pub fn from_records(week_start: NaiveDate, records: &[ExerciseRecord]) -> Self {
        let days: Vec<NaiveDate> = week_days(week_start).collect();
        let keys: Vec<String> = days.iter().copied().map(format_date_key).collect();

        let in_week: Vec<&ExerciseRecord> = records
            .iter()
            .filter(|r| keys.contains(&r.date))
            .collect();

        let daily_stats = days
            .iter()
            .zip(keys.iter())
            .map(|(day, key)| {
                let day_records: Vec<&ExerciseRecord> =
                    in_week.iter().copied().filter(|r| &r.date == key).collect();
                DayStats {
                    date: key.clone(),
                    day_name: day.format("%a").to_string(),
                    exercises: day_records.len() as u32,
                    duration: total_duration(&day_records),
                    calories: total_calories(&day_records),
                }
            })
            .collect();

        let total_workouts = in_week.len() as u32;
        let total_duration = total_duration(&in_week);
        let average_workout_duration = if total_workouts > 0 {
            (f64::from(total_duration) / f64::from(total_workouts)).round() as u32
        } else {
            0
        };

        Self {
            daily_stats,
            total_workouts,
            total_duration,
            total_calories: total_calories(&in_week),
            average_workout_duration,
        }
    }
}

/// Per-type aggregate used by trends.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TypeBreakdown {
    pub exercise_type: ExerciseType,
    pub count: u32,
    pub duration: u32,
    pub calories: u32,
}

/// Activity trends over a trailing window.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProgressTrends {
    pub total_workouts: u32,
    /// Sorted by exercise type
    pub exercise_type_breakdown: Vec<TypeBreakdown>,
    /// Most recent first
    pub recent_exercises: Vec<ExerciseRecord>,
}

impl ProgressTrends {
    pub fn from_records(mut records: Vec<ExerciseRecord>) -> Self {
        let mut by_type: BTreeMap<ExerciseType, TypeBreakdown> = BTreeMap::new();
        for record in &records {
            let entry = by_type
                .entry(record.exercise_type)
                .or_insert_with(|| TypeBreakdown {
                    exercise_type: record.exercise_type,
                    count: 0,
                    duration: 0,
                    calories: 0,
                });
            entry.count += 1;
            entry.duration = entry.duration.saturating_add(record.duration_minutes);
            entry.calories = entry
                .calories
                .saturating_add(record.calories.unwrap_or(0));
        }

        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        let total_workouts = records.len() as u32;
        records.truncate(RECENT_EXERCISES);

        Self {
            total_workouts,
            exercise_type_breakdown: by_type.into_values().collect(),
            recent_exercises: records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn record(date: &str, kind: ExerciseType, minutes: u32, calories: Option<u32>) -> ExerciseRecord {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        ExerciseRecord {
            id: format!("{}-{:?}-{}", date, kind, minutes),
            user_id: "u".to_string(),
            name: "Workout".to_string(),
            exercise_type: kind,
            duration_minutes: minutes,
            reps: None,
            sets: None,
            weight_kg: None,
            calories,
            notes: None,
            completed_at: Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap()),
            date: date.to_string(),
        }
    }

    #[test]
    fn test_daily_progress_totals() {
        let progress = DailyProgress::from_records(vec![
            record("2024-01-15", ExerciseType::Cardio, 30, Some(200)),
            record("2024-01-15", ExerciseType::Strength, 20, None),
            record("2024-01-15", ExerciseType::Cardio, 10, Some(50)),
        ]);

        assert_eq!(progress.exercise_count, 3);
        assert_eq!(progress.total_duration, 60);
        assert_eq!(progress.total_calories, 250);
        assert_eq!(
            progress.exercise_types,
            vec![ExerciseType::Cardio, ExerciseType::Strength]
        );
    }

    #[test]
    fn test_weekly_progress_groups_by_day() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let records = vec![
            record("2024-01-15", ExerciseType::Cardio, 30, Some(100)),
            record("2024-01-17", ExerciseType::Strength, 45, None),
            record("2024-01-17", ExerciseType::Cardio, 20, Some(80)),
            record("2024-01-22", ExerciseType::Cardio, 99, None), // next week
        ];

        let weekly = WeeklyProgress::from_records(monday, &records);

        assert_eq!(weekly.daily_stats.len(), 7);
        assert_eq!(weekly.daily_stats[0].day_name, "Mon");
        assert_eq!(weekly.daily_stats[0].exercises, 1);
        assert_eq!(weekly.daily_stats[2].date, "2024-01-17");
        assert_eq!(weekly.daily_stats[2].duration, 65);
        assert_eq!(weekly.daily_stats[6].day_name, "Sun");
        assert_eq!(weekly.total_workouts, 3);
        assert_eq!(weekly.total_duration, 95);
        assert_eq!(weekly.total_calories, 180);
        assert_eq!(weekly.average_workout_duration, 32); // round(31.67)
    }

    #[test]
    fn test_trends_breakdown_and_recent() {
        let mut records: Vec<ExerciseRecord> = (0..12)
            .map(|i| {
                let mut r = record("2024-01-15", ExerciseType::Cardio, 10, Some(5));
                r.id = format!("r{}", i);
                r.completed_at += Duration::minutes(i);
                r
            })
            .collect();
        records.push(record("2024-01-10", ExerciseType::Flexibility, 15, None));

        let trends = ProgressTrends::from_records(records);

        assert_eq!(trends.total_workouts, 13);
        assert_eq!(trends.exercise_type_breakdown.len(), 2);
        assert_eq!(trends.exercise_type_breakdown[0].exercise_type, ExerciseType::Cardio);
        assert_eq!(trends.exercise_type_breakdown[0].count, 12);
        assert_eq!(trends.exercise_type_breakdown[0].calories, 60);
        assert_eq!(trends.recent_exercises.len(), RECENT_EXERCISES);
        assert_eq!(trends.recent_exercises[0].id, "r11");
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let big = Some(u32::MAX / 2 + 10);
        let daily = DailyProgress::from_records(vec![
            record("2024-01-15", ExerciseType::Cardio, 30, big),
            record("2024-01-15", ExerciseType::Strength, 45, big),
        ]);
        assert_eq!(daily.total_calories, u32::MAX);
        assert_eq!(daily.total_duration, 75);

        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let weekly = WeeklyProgress::from_records(
            monday,
            &[
                record("2024-01-15", ExerciseType::Cardio, 30, big),
                record("2024-01-16", ExerciseType::Cardio, 30, big),
            ],
        );
        assert_eq!(weekly.total_calories, u32::MAX);

        let trends = ProgressTrends::from_records(vec![
            record("2024-01-15", ExerciseType::Cardio, 30, big),
            record("2024-01-16", ExerciseType::Cardio, 20, big),
        ]);
        assert_eq!(trends.exercise_type_breakdown[0].calories, u32::MAX);
    }
}
