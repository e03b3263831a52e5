// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live status routes polled by the display client.

use crate::error::{AppError, Result};
use crate::models::status::{DEFAULT_TARGET_END_TIME, NOT_AVAILABLE};
use crate::models::{InOut, StatusRecord};
use crate::time_utils::{format_12h, format_utc_rfc3339, parse_hh_mm};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Status routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/getSwipeData", get(get_swipe_data))
        .route("/updateTargetTime/{time}", get(update_target_time))
}

// ─── Current Status ──────────────────────────────────────────

/// Current status response.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "camelCase")]
pub struct SwipeDataResponse {
    /// Worked time, `HH:MM`
    pub total_hours: String,
    pub total_hours_raw: f64,
    pub current_status: InOut,
    pub estimated_completion_time: String,
    pub buffer_time: String,
    /// 24-hour `HH:MM`, as set through `/updateTargetTime`
    pub target_end_time: String,
    /// Same target on the 12-hour clock
    pub target_end_time_display: String,
    pub in_time: Option<String>,
    pub last_out: Option<String>,
    pub last_updated_at: Option<String>,
}

impl From<StatusRecord> for SwipeDataResponse {
    fn from(record: StatusRecord) -> Self {
        let target_end_time = or_default(record.target_end_time, DEFAULT_TARGET_END_TIME);
        let target_end_time_display = parse_hh_mm(&target_end_time)
            .map(|t| format_12h(&t))
            .unwrap_or_else(|| target_end_time.clone());

        Self {
            total_hours: or_default(record.total_hours_formatted, "00:00"),
            total_hours_raw: record.total_hours_raw,
            current_status: record.current_status,
            estimated_completion_time: or_default(
                record.estimated_completion_time,
                NOT_AVAILABLE,
            ),
            buffer_time: or_default(record.buffer_time, NOT_AVAILABLE),
            target_end_time,
            target_end_time_display,
            in_time: Some(record.in_time).filter(|t| !t.is_empty()),
            last_out: Some(record.last_out).filter(|t| !t.is_empty()),
            last_updated_at: record.last_updated_at.map(format_utc_rfc3339),
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Latest computed status.
///
/// Never fails: a store error is logged and the default record is served.
async fn get_swipe_data(State(state): State<Arc<AppState>>) -> Json<SwipeDataResponse> {
    let record = state.db.get_status_or_default().await;
    Json(SwipeDataResponse::from(record))
}

// ─── Target End Time ─────────────────────────────────────────

/// Response for a target end time update.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct UpdateTargetResponse {
    pub success: bool,
    pub message: String,
}

/// Set the target end of day (`HH:MM`, 24-hour, zero-padded).
///
/// Only the target changes; the buffer is recomputed on the next refresh.
async fn update_target_time(
    State(state): State<Arc<AppState>>,
    Path(time): Path<String>,
) -> Result<Json<UpdateTargetResponse>> {
    if parse_hh_mm(&time).is_none() {
        tracing::debug!(time = %time, "Rejected target end time");
        return Err(AppError::Validation(
            "Invalid time format. Use HH:MM".to_string(),
        ));
    }

    state.db.set_target_end_time(time.clone()).await?;
    tracing::info!(target_end_time = %time, "Target end time updated");

    Ok(Json(UpdateTargetResponse {
        success: true,
        message: format!("Target end time updated to {}", time),
    }))
}
