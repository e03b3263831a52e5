// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly view routes.
//!
//! Both endpoints degrade to an empty week when the store is unreadable.

use crate::models::{DailyAggregate, WeeklySummary, WorkDay};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use chrono::{Datelike, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Weekly routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/getWeeklyData", get(get_weekly_data))
        .route("/getWeeklySummary", get(get_weekly_summary))
}

/// One day's total in the weekly data map.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub total_in_time: f64,
}

async fn load_weekly(state: &AppState) -> Vec<DailyAggregate> {
    state.db.get_weekly().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Weekly read failed, serving empty week");
        Vec::new()
    })
}

/// Stored per-day totals keyed by weekday name.
async fn get_weekly_data(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<WorkDay, DailyTotal>> {
    let days = load_weekly(&state).await;
    Json(
        days.into_iter()
            .map(|d| {
                (
                    d.day,
                    DailyTotal {
                        total_in_time: d.total_in_time_hours,
                    },
                )
            })
            .collect(),
    )
}

/// Week strip states and progress toward the weekly target.
async fn get_weekly_summary(State(state): State<Arc<AppState>>) -> Json<WeeklySummary> {
    let days = load_weekly(&state).await;
    let today = WorkDay::from_weekday(Local::now().weekday());
    Json(WeeklySummary::from_aggregates(&days, today))
}
