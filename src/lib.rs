// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Swipe-Tracker: live attendance from badge swipes
//!
//! This crate pulls the day's badge swipes from an attendance portal,
//! rebuilds IN/OUT sessions, and serves worked time, completion estimate
//! and buffer to a polling status display.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::StatusDb;

/// Shared application state, handed to the refresh loop and every handler.
pub struct AppState {
    pub config: Config,
    pub db: StatusDb,
}
