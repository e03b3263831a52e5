// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use swipe_tracker::config::Config;
use swipe_tracker::db::StatusDb;
use swipe_tracker::error::AppError;
use swipe_tracker::models::{DailyAggregate, RawSwipe};
use swipe_tracker::routes::create_router;
use swipe_tracker::services::{Authenticator, Credential, SwipeSource};
use swipe_tracker::AppState;

/// Build shared state around a fresh in-memory store.
#[allow(dead_code)]
pub fn test_state_with(config: Config) -> Arc<AppState> {
    let db = StatusDb::open_in_memory().expect("Failed to open in-memory store");
    Arc::new(AppState { config, db })
}

#[allow(dead_code)]
pub fn test_state() -> Arc<AppState> {
    test_state_with(Config::test_default())
}

/// Create a test app backed by an in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = test_state();
    (create_router(state.clone()), state)
}

/// Fixed "now" for refresh tests: 2024-05-06 17:00 local time.
#[allow(dead_code)]
pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap()
}

/// A portal swipe with a zone-less punch time on 2024-05-06.
#[allow(dead_code)]
pub fn swipe(hh_mm: &str, indicator: i64) -> RawSwipe {
    RawSwipe {
        punch_time: format!("2024-05-06T{}:00", hh_mm),
        in_out_indicator: serde_json::json!(indicator),
    }
}

/// A typical day: 09:00-12:00, back at 12:30 and still in.
#[allow(dead_code)]
pub fn workday_swipes() -> Vec<RawSwipe> {
    // Deliberately out of order
    vec![swipe("12:30", 1), swipe("09:00", 1), swipe("12:00", 0)]
}

/// What the fake portal does when asked.
#[allow(dead_code)]
#[derive(Clone)]
pub enum Script {
    Swipes(Vec<RawSwipe>),
    AuthFails,
    FetchFails,
    /// Login never answers
    Hangs,
}

/// Scripted stand-in for the attendance portal.
#[allow(dead_code)]
pub struct FakePortal {
    script: Script,
    weekly: Result<Option<Vec<DailyAggregate>>, String>,
    pub logins: AtomicUsize,
}

#[allow(dead_code)]
impl FakePortal {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            weekly: Ok(None),
            logins: AtomicUsize::new(0),
        })
    }

    pub fn with_weekly(
        script: Script,
        weekly: Result<Option<Vec<DailyAggregate>>, String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script,
            weekly,
            logins: AtomicUsize::new(0),
        })
    }

    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authenticator for FakePortal {
    async fn fetch_session(&self) -> Result<Credential, AppError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::AuthFails => Err(AppError::Auth("no session cookies".to_string())),
            Script::Hangs => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AppError::Auth("unreachable".to_string()))
            }
            _ => Ok(Credential::new("SESSION=test")),
        }
    }
}

#[async_trait]
impl SwipeSource for FakePortal {
    async fn fetch_swipes(&self, credential: &Credential) -> Result<Vec<RawSwipe>, AppError> {
        assert_eq!(credential.cookie_header(), "SESSION=test");
        match &self.script {
            Script::Swipes(swipes) => Ok(swipes.clone()),
            Script::FetchFails => Err(AppError::Fetch("HTTP 500: boom".to_string())),
            _ => Err(AppError::Fetch("not scripted".to_string())),
        }
    }

    async fn fetch_weekly(
        &self,
        _credential: &Credential,
    ) -> Result<Option<Vec<DailyAggregate>>, AppError> {
        self.weekly.clone().map_err(AppError::Fetch)
    }
}
