// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite).

pub mod sqlite;

pub use sqlite::StatusDb;

/// Table names as constants.
pub mod tables {
    /// Single-row live status (id = 1)
    pub const STATUS: &str = "status";
    /// Per-weekday totals for the weekly view
    pub const WEEKLY: &str = "weekly";
}
