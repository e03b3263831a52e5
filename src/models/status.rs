// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The single persisted "now" status row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::InOut;

/// Target end of day used until the user sets another one.
pub const DEFAULT_TARGET_END_TIME: &str = "18:30";

/// Placeholder shown for estimates that have never been computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// Latest computed attendance status.
///
/// Stored at: `status` table, row `id = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Worked time as `HH:MM`
    pub total_hours_formatted: String,
    /// Worked time in hours, two decimals
    pub total_hours_raw: f64,
    pub current_status: InOut,
    /// `h:mm AM/PM`, `Completed`, `Not checked in` or `N/A`
    pub estimated_completion_time: String,
    /// Signed `HH:MM`; negative is overtime or shortfall
    pub buffer_time: String,
    /// 24-hour `HH:MM`
    pub target_end_time: String,
    pub last_updated_at: Option<DateTime<Utc>>,
    /// First IN of the day, `h:mm AM/PM`, empty if none
    #[serde(default)]
    pub in_time: String,
    /// Last OUT of the day, `h:mm AM/PM`, empty if none
    #[serde(default)]
    pub last_out: String,
}

impl Default for StatusRecord {
    /// The record reported when nothing usable is stored.
    fn default() -> Self {
        Self {
            total_hours_formatted: "00:00".to_string(),
            total_hours_raw: 0.0,
            current_status: InOut::Out,
            estimated_completion_time: NOT_AVAILABLE.to_string(),
            buffer_time: NOT_AVAILABLE.to_string(),
            target_end_time: DEFAULT_TARGET_END_TIME.to_string(),
            last_updated_at: None,
            in_time: String::new(),
            last_out: String::new(),
        }
    }
}
