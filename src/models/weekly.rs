// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly attendance aggregates for the display client's week strip.
//!
//! Aggregates are replaced wholesale from the portal; they are never derived
//! from the live status row.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Hours that make a day complete.
pub const DAILY_TARGET_HOURS: f64 = 8.0;

/// Tracked days of the week (Sunday is never worked).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "lowercase")]
pub enum WorkDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 6] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
        WorkDay::Saturday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkDay::Monday => "monday",
            WorkDay::Tuesday => "tuesday",
            WorkDay::Wednesday => "wednesday",
            WorkDay::Thursday => "thursday",
            WorkDay::Friday => "friday",
            WorkDay::Saturday => "saturday",
        }
    }

    /// Monday to Friday; these count toward the weekly target.
    pub fn is_workday(self) -> bool {
        self != WorkDay::Saturday
    }

    pub fn from_weekday(day: Weekday) -> Option<Self> {
        match day {
            Weekday::Mon => Some(WorkDay::Monday),
            Weekday::Tue => Some(WorkDay::Tuesday),
            Weekday::Wed => Some(WorkDay::Wednesday),
            Weekday::Thu => Some(WorkDay::Thursday),
            Weekday::Fri => Some(WorkDay::Friday),
            Weekday::Sat => Some(WorkDay::Saturday),
            Weekday::Sun => None,
        }
    }
}

impl FromStr for WorkDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkDay::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown weekday: {}", s))
    }
}

/// Total in-office hours for one day of the current week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAggregate {
    pub day: WorkDay,
    pub total_in_time_hours: f64,
}

/// Display state of a day in the week strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    /// Highlighted regardless of hours.
    Today,
    Complete,
    Partial,
    Empty,
}

impl DayState {
    pub fn classify(hours: f64, is_today: bool) -> Self {
        if is_today {
            DayState::Today
        } else if hours >= DAILY_TARGET_HOURS {
            DayState::Complete
        } else if hours > 0.0 {
            DayState::Partial
        } else {
            DayState::Empty
        }
    }
}

/// One day in the weekly summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub day: WorkDay,
    pub total_in_time: f64,
    pub state: DayState,
}

/// Week-to-date progress against the Monday to Friday target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Sum over all tracked days, one decimal
    pub total_hours: f64,
    /// Workdays at or above the daily target
    pub completed_days: u32,
    /// Percent of the 40-hour week, rounded
    pub target_progress: u32,
    pub days: Vec<DaySummary>,
}

impl WeeklySummary {
    /// Build the summary; days without an aggregate count as zero hours.
    pub fn from_aggregates(aggregates: &[DailyAggregate], today: Option<WorkDay>) -> Self {
        let hours: BTreeMap<WorkDay, f64> = aggregates
            .iter()
            .map(|a| (a.day, a.total_in_time_hours.max(0.0)))
            .collect();

        let days: Vec<DaySummary> = WorkDay::ALL
            .into_iter()
            .map(|day| {
                let total = hours.get(&day).copied().unwrap_or(0.0);
                DaySummary {
                    day,
                    total_in_time: total,
                    state: DayState::classify(total, today == Some(day)),
                }
            })
            .collect();

        let total: f64 = days.iter().map(|d| d.total_in_time).sum();
        let completed_days = days
            .iter()
            .filter(|d| d.day.is_workday() && d.total_in_time >= DAILY_TARGET_HOURS)
            .count() as u32;
        let workdays = WorkDay::ALL.iter().filter(|d| d.is_workday()).count() as f64;
        let target_hours = workdays * DAILY_TARGET_HOURS;

        Self {
            total_hours: (total * 10.0).round() / 10.0,
            completed_days,
            target_progress: (total / target_hours * 100.0).round() as u32,
            days,
        }
    }
}
