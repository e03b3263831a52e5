// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Timer-driven refresh: authenticate, fetch swipes, recompute, persist.
//!
//! A failed tick is logged and abandoned; the stored status row keeps its
//! previous value and the next tick runs on schedule.

use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::AppError;
use crate::models::StatusRecord;
use crate::services::attendance;
use crate::services::portal::{Authenticator, Credential, SwipeSource};
use crate::AppState;

/// Periodic refresh task.
pub struct RefreshLoop {
    state: Arc<AppState>,
    authenticator: Arc<dyn Authenticator>,
    source: Arc<dyn SwipeSource>,
    clock: fn() -> DateTime<Local>,
}

impl RefreshLoop {
    pub fn new(
        state: Arc<AppState>,
        authenticator: Arc<dyn Authenticator>,
        source: Arc<dyn SwipeSource>,
    ) -> Self {
        Self {
            state,
            authenticator,
            source,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used for live extrapolation.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Run one refresh cycle and return the record that was stored.
    pub async fn tick(&self) -> Result<StatusRecord, AppError> {
        let limit = self.state.config.upstream_timeout;

        let credential = bounded(
            limit,
            "authentication",
            self.authenticator.fetch_session(),
            AppError::Auth,
        )
        .await?;

        let raw = bounded(
            limit,
            "swipe fetch",
            self.source.fetch_swipes(&credential),
            AppError::Fetch,
        )
        .await?;

        let events = attendance::parse_swipes(&raw, self.state.config.punch_time_zone)?;
        let now = (self.clock)();

        let record = self
            .state
            .db
            .refresh_status(move |target| attendance::build_status(events, target, now))
            .await?;

        self.refresh_weekly(&credential).await;

        Ok(record)
    }

    /// Replace weekly totals if the source provides them. Never fails the tick.
    async fn refresh_weekly(&self, credential: &Credential) {
        let limit = self.state.config.upstream_timeout;
        let fetched = bounded(
            limit,
            "weekly fetch",
            self.source.fetch_weekly(credential),
            AppError::Fetch,
        )
        .await;

        match fetched {
            Ok(Some(days)) => {
                if let Err(e) = self.state.db.replace_weekly(days).await {
                    tracing::error!(error = %e, "Failed to store weekly totals");
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Weekly refresh skipped"),
        }
    }

    /// Tick on the configured interval until `shutdown` fires.
    ///
    /// An in-flight tick is abandoned on shutdown; the store is only ever
    /// written in a single transaction, so nothing is left half-updated.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let period = self.state.config.refresh_interval;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = period.as_secs(), "Refresh loop started");

        while !*shutdown.borrow() {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    tracing::info!("Abandoning in-flight refresh");
                    break;
                }
                result = self.tick() => log_outcome(result),
            }
        }

        tracing::info!("Refresh loop stopped");
    }
}

fn log_outcome(result: Result<StatusRecord, AppError>) {
    match result {
        Ok(record) => tracing::info!(
            total_hours = %record.total_hours_formatted,
            status = record.current_status.as_str(),
            completion = %record.estimated_completion_time,
            buffer = %record.buffer_time,
            "Status refreshed"
        ),
        Err(e) if e.is_upstream() => {
            tracing::warn!(error = %e, "Refresh tick failed, keeping previous status")
        }
        Err(e) => tracing::error!(error = %e, "Refresh tick failed, keeping previous status"),
    }
}

/// Await `fut`, converting an elapsed timeout into an error via `on_timeout`.
async fn bounded<T, F>(
    limit: Duration,
    what: &'static str,
    fut: F,
    on_timeout: fn(String) -> AppError,
) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(format!("{} timed out after {:?}", what, limit))),
    }
}
