// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swipe processing: normalization, session reconstruction and live
//! extrapolation, chained into a [`StatusRecord`].
//!
//! Everything here is pure; the caller supplies "now" so results are
//! reproducible.

use chrono::{DateTime, Local, NaiveTime, SubsecRound, Utc};

use crate::error::AppError;
use crate::models::status::DEFAULT_TARGET_END_TIME;
use crate::models::{InOut, PunchTimeZone, RawSwipe, StatusRecord, SwipeEvent};
use crate::services::estimator;
use crate::time_utils::{format_12h, format_worked_seconds, parse_hh_mm};

/// Worked time reconstructed from a day's swipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionAccumulation {
    pub total_worked_seconds: i64,
    /// Start of the still-open session; present iff `current_status` is IN
    pub open_session_start: Option<DateTime<Local>>,
    pub current_status: InOut,
    /// First accepted IN of the day
    pub first_in: Option<DateTime<Local>>,
    /// Last accepted OUT of the day
    pub last_out: Option<DateTime<Local>>,
}

impl Default for SessionAccumulation {
    fn default() -> Self {
        Self {
            total_worked_seconds: 0,
            open_session_start: None,
            current_status: InOut::Out,
            first_in: None,
            last_out: None,
        }
    }
}

/// Convert raw portal records into swipe events.
///
/// Fails with `MalformedPayload` on the first unparseable punch time.
pub fn parse_swipes(raw: &[RawSwipe], zone: PunchTimeZone) -> Result<Vec<SwipeEvent>, AppError> {
    raw.iter()
        .map(|swipe| {
            let timestamp = zone.parse(&swipe.punch_time).ok_or_else(|| {
                AppError::MalformedPayload(format!(
                    "unparseable punchTime {:?}",
                    swipe.punch_time
                ))
            })?;
            Ok(SwipeEvent::new(
                timestamp,
                InOut::from_indicator(&swipe.in_out_indicator),
            ))
        })
        .collect()
}

/// Sort swipes ascending by timestamp, keeping source order for ties.
pub fn normalize(mut events: Vec<SwipeEvent>) -> Vec<SwipeEvent> {
    // `sort_by_key` is stable
    events.sort_by_key(|e| e.timestamp);
    events
}

/// Fold sorted swipes into worked time.
///
/// A repeated IN keeps the original session start; an OUT with no open
/// session is dropped.
pub fn reconstruct(sorted: &[SwipeEvent]) -> SessionAccumulation {
    sorted
        .iter()
        .fold(SessionAccumulation::default(), |mut acc, event| {
            match (acc.current_status, event.direction) {
                (InOut::Out, InOut::In) => {
                    acc.open_session_start = Some(event.timestamp);
                    acc.current_status = InOut::In;
                    acc.first_in.get_or_insert(event.timestamp);
                }
                (InOut::In, InOut::Out) => {
                    if let Some(start) = acc.open_session_start.take() {
                        acc.total_worked_seconds += (event.timestamp - start).num_seconds();
                    }
                    acc.current_status = InOut::Out;
                    acc.last_out = Some(event.timestamp);
                }
                (InOut::In, InOut::In) | (InOut::Out, InOut::Out) => {}
            }
            acc
        })
}

/// Extend an open session up to `now` for reporting.
///
/// Skips the extension (with a warning) when the open session start is
/// missing or lies in the future.
pub fn extrapolate(acc: SessionAccumulation, now: DateTime<Local>) -> SessionAccumulation {
    if acc.current_status != InOut::In {
        return acc;
    }

    let Some(start) = acc.open_session_start else {
        tracing::warn!("Currently IN without an open session start; skipping extrapolation");
        return acc;
    };

    let elapsed = (now - start).num_seconds();
    if elapsed < 0 {
        tracing::warn!(
            open_session_start = %start,
            now = %now,
            "Open session starts after now; skipping extrapolation"
        );
        return acc;
    }

    tracing::debug!(elapsed_seconds = elapsed, "Currently IN, extending to now");
    SessionAccumulation {
        total_worked_seconds: acc.total_worked_seconds + elapsed,
        ..acc
    }
}

/// Run the full pipeline and format the status row.
///
/// `target_end` is the stored target; an unparseable value falls back to
/// the default target, which is also what gets persisted.
pub fn build_status(events: Vec<SwipeEvent>, target_end: &str, now: DateTime<Local>) -> StatusRecord {
    let (target_time, target_end_time) = match parse_hh_mm(target_end) {
        Some(t) => (t, target_end.to_string()),
        None => {
            tracing::warn!(target_end, "Stored target end time is invalid, using default");
            (default_target_time(), DEFAULT_TARGET_END_TIME.to_string())
        }
    };

    let sorted = normalize(events);
    let acc = extrapolate(reconstruct(&sorted), now);
    let estimate = estimator::estimate(
        acc.total_worked_seconds,
        acc.current_status,
        target_time,
        now,
    );

    let total_hours_raw = (acc.total_worked_seconds as f64 / 3600.0 * 100.0).round() / 100.0;

    tracing::info!(
        swipes = sorted.len(),
        total_seconds = acc.total_worked_seconds,
        status = acc.current_status.as_str(),
        completion = %estimate.completion,
        buffer_minutes = estimate.buffer_minutes,
        "Attendance computed"
    );

    StatusRecord {
        total_hours_formatted: format_worked_seconds(acc.total_worked_seconds),
        total_hours_raw,
        current_status: acc.current_status,
        estimated_completion_time: estimate.completion.to_string(),
        buffer_time: estimate.buffer_time(),
        target_end_time,
        last_updated_at: Some(now.with_timezone(&Utc).trunc_subsecs(0)),
        in_time: acc.first_in.map(|t| format_12h(&t)).unwrap_or_default(),
        last_out: acc.last_out.map(|t| format_12h(&t)).unwrap_or_default(),
    }
}

fn default_target_time() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 30, 0).unwrap_or_default()
}
