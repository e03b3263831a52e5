// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod attendance;
pub mod estimator;
pub mod portal;
pub mod refresh;

pub use attendance::{build_status, SessionAccumulation};
pub use estimator::{Completion, Estimate};
pub use portal::{Authenticator, Credential, PortalClient, SwipeSource};
pub use refresh::RefreshLoop;
