// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completion time and buffer estimation against the 8-hour target.
//!
//! All time-of-day arithmetic is in minutes since local midnight. Windows
//! that cross midnight are not wrapped, so a completion after midnight
//! yields a large positive buffer.

use chrono::{DateTime, Duration, Local, NaiveTime};
use std::fmt;

use crate::models::InOut;
use crate::time_utils::{format_12h, format_signed_minutes, minutes_of_day};

/// Work required for a full day.
pub const TARGET_WORK_SECONDS: i64 = 8 * 3600;

/// When the daily target is (or was) reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Still IN; the target is reached at this instant if work continues.
    At(DateTime<Local>),
    Completed,
    /// OUT with time still owed.
    NotCheckedIn,
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Completion::At(t) => f.write_str(&format_12h(t)),
            Completion::Completed => f.write_str("Completed"),
            Completion::NotCheckedIn => f.write_str("Not checked in"),
        }
    }
}

/// Estimator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Estimate {
    pub completion: Completion,
    /// Positive: margin before the target end. Negative: overtime or shortfall.
    pub buffer_minutes: i64,
}

impl Estimate {
    /// Buffer as signed `HH:MM`.
    pub fn buffer_time(&self) -> String {
        format_signed_minutes(self.buffer_minutes)
    }
}

/// Estimate completion and buffer.
///
/// `total_worked_seconds` must already include any live extrapolation.
pub fn estimate(
    total_worked_seconds: i64,
    status: InOut,
    target_end: NaiveTime,
    now: DateTime<Local>,
) -> Estimate {
    let target_minutes = minutes_of_day(&target_end);
    let reached = total_worked_seconds >= TARGET_WORK_SECONDS;

    match (status, reached) {
        (InOut::In, false) => {
            let remaining = TARGET_WORK_SECONDS - total_worked_seconds;
            let completion = now + Duration::seconds(remaining);
            Estimate {
                completion: Completion::At(completion),
                buffer_minutes: target_minutes - minutes_of_day(&completion),
            }
        }
        (InOut::In, true) => Estimate {
            completion: Completion::Completed,
            buffer_minutes: -ceil_minutes(total_worked_seconds - TARGET_WORK_SECONDS),
        },
        (InOut::Out, false) => {
            let remaining_minutes = ceil_minutes(TARGET_WORK_SECONDS - total_worked_seconds);
            Estimate {
                completion: Completion::NotCheckedIn,
                buffer_minutes: (target_minutes - minutes_of_day(&now)) - remaining_minutes,
            }
        }
        (InOut::Out, true) => Estimate {
            completion: Completion::Completed,
            buffer_minutes: 0,
        },
    }
}

/// Whole minutes, rounded up, for a non-negative second count.
fn ceil_minutes(secs: i64) -> i64 {
    (secs + 59).div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now_at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 8, h, m, s).unwrap()
    }

    fn target() -> NaiveTime {
        NaiveTime::from_hms_opt(18, 30, 0).unwrap()
    }

    #[test]
    fn test_in_under_target_before_end() {
        let est = estimate(7 * 3600, InOut::In, target(), now_at(10, 0, 0));
        assert_eq!(est.completion, Completion::At(now_at(11, 0, 0)));
        assert_eq!(est.completion.to_string(), "11:00 AM");
        assert_eq!(est.buffer_minutes, 450);
        assert_eq!(est.buffer_time(), "07:30");
    }

    #[test]
    fn test_in_under_target_after_end() {
        // Four hours left at 16:00 -> 20:00, 90 minutes past 18:30
        let est = estimate(4 * 3600, InOut::In, target(), now_at(16, 0, 0));
        assert_eq!(est.completion.to_string(), "8:00 PM");
        assert_eq!(est.buffer_time(), "-01:30");
    }

    #[test]
    fn test_in_exactly_target() {
        let est = estimate(TARGET_WORK_SECONDS, InOut::In, target(), now_at(17, 0, 0));
        assert_eq!(est.completion, Completion::Completed);
        assert_eq!(est.buffer_time(), "00:00");
    }

    #[test]
    fn test_in_overtime_rounds_up() {
        let est = estimate(TARGET_WORK_SECONDS + 61, InOut::In, target(), now_at(19, 0, 0));
        assert_eq!(est.completion, Completion::Completed);
        assert_eq!(est.buffer_minutes, -2);
        assert_eq!(est.buffer_time(), "-00:02");
    }

    #[test]
    fn test_out_under_target() {
        let est = estimate(0, InOut::Out, target(), now_at(9, 0, 0));
        assert_eq!(est.completion, Completion::NotCheckedIn);
        assert_eq!(est.completion.to_string(), "Not checked in");
        // 570 minutes until 18:30, 480 still owed
        assert_eq!(est.buffer_minutes, 90);
    }

    #[test]
    fn test_out_under_target_partial_minute() {
        // 30 seconds short of 8h still owes a whole minute
        let est = estimate(TARGET_WORK_SECONDS - 30, InOut::Out, target(), now_at(18, 29, 0));
        assert_eq!(est.buffer_minutes, 0);
    }

    #[test]
    fn test_out_over_target() {
        let est = estimate(9 * 3600, InOut::Out, target(), now_at(19, 0, 0));
        assert_eq!(est.completion, Completion::Completed);
        assert_eq!(est.buffer_minutes, 0);
    }
}
