// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveTime, SecondsFormat, Timelike, Utc};

/// Minutes in a day; time-of-day arithmetic never leaves `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Minutes since midnight for any time-of-day value.
pub fn minutes_of_day<T: Timelike>(t: &T) -> i64 {
    (t.hour() * 60 + t.minute()) as i64
}

/// Parse a strict, zero-padded 24-hour `HH:MM` string.
pub fn parse_hh_mm(raw: &str) -> Option<NaiveTime> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

/// Render a time of day on the 12-hour clock, e.g. `6:30 PM`.
pub fn format_12h<T: Timelike>(t: &T) -> String {
    let (pm, hour12) = t.hour12();
    format!(
        "{}:{:02} {}",
        hour12,
        t.minute(),
        if pm { "PM" } else { "AM" }
    )
}

/// Render a signed minute count as `HH:MM`, prefixing negatives with `-`.
pub fn format_signed_minutes(mins: i64) -> String {
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Render a non-negative second count as `HH:MM` of whole minutes.
pub fn format_worked_seconds(secs: i64) -> String {
    format_signed_minutes(secs.max(0) / 60)
}

/// Render fractional hours (legacy `totalHours` column values) as `HH:MM`.
pub fn format_hours(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "00:00".to_string();
    }
    format_signed_minutes((hours * 60.0).round() as i64)
}
