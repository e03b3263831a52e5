// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use crate::models::PunchTimeZone;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Local port the display client polls.
pub const DEFAULT_PORT: u16 = 6847;
/// Seconds between refresh ticks.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 50;
/// Upper bound for a single portal call.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Service ---
    /// Server port
    pub port: u16,
    /// Interface the API binds to
    pub bind_address: String,
    /// SQLite status database file
    pub database_path: PathBuf,
    /// Delay between refresh ticks
    pub refresh_interval: Duration,
    /// Timeout applied to authentication and fetch calls
    pub upstream_timeout: Duration,

    // --- Attendance portal ---
    /// Portal origin, e.g. `https://example.greythr.com`
    pub portal_base_url: String,
    pub portal_login_path: String,
    pub portal_swipes_path: String,
    /// Weekly totals endpoint; weekly refresh is skipped when unset
    pub portal_weekly_path: Option<String>,
    /// Zone applied to punch times that carry no offset
    pub punch_time_zone: PunchTimeZone,

    // --- Secrets ---
    pub portal_username: String,
    pub portal_password: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_address: "127.0.0.1".to_string(),
            database_path: PathBuf::from(":memory:"),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            upstream_timeout: Duration::from_secs(2),
            portal_base_url: "http://127.0.0.1:9".to_string(),
            portal_login_path: "/uas/portal/auth/login".to_string(),
            portal_swipes_path: "/v3/api/attendance/swipes".to_string(),
            portal_weekly_path: None,
            punch_time_zone: PunchTimeZone::Local,
            portal_username: "test_user".to_string(),
            portal_password: "test_password".to_string(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let punch_time_zone = match lookup("PUNCH_TIME_ZONE") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid("PUNCH_TIME_ZONE", raw))?,
            None => PunchTimeZone::Local,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("swipe_data.db")),
            refresh_interval: Duration::from_secs(parse_or(
                &lookup,
                "REFRESH_INTERVAL_SECS",
                DEFAULT_REFRESH_INTERVAL_SECS,
            )?),
            upstream_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )?),

            portal_base_url: required("PORTAL_BASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            portal_login_path: lookup("PORTAL_LOGIN_PATH")
                .unwrap_or_else(|| "/uas/portal/auth/login".to_string()),
            portal_swipes_path: lookup("PORTAL_SWIPES_PATH")
                .unwrap_or_else(|| "/v3/api/attendance/swipes".to_string()),
            portal_weekly_path: lookup("PORTAL_WEEKLY_PATH").filter(|p| !p.trim().is_empty()),
            punch_time_zone,

            portal_username: required("PORTAL_USERNAME")?,
            portal_password: required("PORTAL_PASSWORD")?,
        })
    }

    /// Socket address string for the API listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
