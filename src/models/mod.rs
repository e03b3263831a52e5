// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod status;
pub mod swipe;
pub mod weekly;

pub use status::StatusRecord;
pub use swipe::{InOut, PunchTimeZone, RawSwipe, SwipeEvent};
pub use weekly::{DailyAggregate, DayState, WeeklySummary, WorkDay};
