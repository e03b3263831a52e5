// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attendance portal client.
//!
//! Handles:
//! - Credentialed login, yielding a session cookie set
//! - Fetching the current day's raw swipes
//! - Fetching weekly per-day totals (optional endpoint)
//!
//! The refresh loop only sees the [`Authenticator`] and [`SwipeSource`]
//! traits, so tests can script the portal.

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE, USER_AGENT};
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{DailyAggregate, RawSwipe, WorkDay};

const PORTAL_USER_AGENT: &str = "Mozilla/5.0";

/// Session cookies returned by a successful login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    cookie_header: String,
}

impl Credential {
    pub fn new(cookie_header: impl Into<String>) -> Self {
        Self {
            cookie_header: cookie_header.into(),
        }
    }

    /// Value for the `Cookie` request header.
    pub fn cookie_header(&self) -> &str {
        &self.cookie_header
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("cookie_header", &"<redacted>")
            .finish()
    }
}

/// Yields a fresh portal session.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn fetch_session(&self) -> Result<Credential, AppError>;
}

/// Yields raw attendance data for an authenticated session.
#[async_trait]
pub trait SwipeSource: Send + Sync {
    /// Today's swipes, in whatever order the portal returns them.
    async fn fetch_swipes(&self, credential: &Credential) -> Result<Vec<RawSwipe>, AppError>;

    /// Week-to-date per-day totals; `None` when the source has none.
    async fn fetch_weekly(
        &self,
        _credential: &Credential,
    ) -> Result<Option<Vec<DailyAggregate>>, AppError> {
        Ok(None)
    }
}

/// HTTP client for the attendance portal.
#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    login_path: String,
    swipes_path: String,
    weekly_path: Option<String>,
    username: String,
    password: String,
}

impl PortalClient {
    /// Create a portal client from configuration.
    ///
    /// Redirects are not followed so the login response's cookies are seen
    /// directly.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;

        Ok(Self {
            http,
            base_url: config.portal_base_url.clone(),
            login_path: config.portal_login_path.clone(),
            swipes_path: config.portal_swipes_path.clone(),
            weekly_path: config.portal_weekly_path.clone(),
            username: config.portal_username.clone(),
            password: config.portal_password.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated GET returning the body text.
    async fn get_text(&self, path: &str, credential: &Credential) -> Result<String, AppError> {
        let response = self
            .http
            .get(self.url(path))
            .header(COOKIE, credential.cookie_header())
            .header(USER_AGENT, PORTAL_USER_AGENT)
            .send()
            .await
            .map_err(|e| AppError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                tracing::warn!(%status, "Portal rejected the session");
            }
            return Err(AppError::Fetch(format!("HTTP {}: {}", status, truncate(&body))));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read body: {}", e)))
    }
}

#[async_trait]
impl Authenticator for PortalClient {
    async fn fetch_session(&self) -> Result<Credential, AppError> {
        let response = self
            .http
            .post(self.url(&self.login_path))
            .header(USER_AGENT, PORTAL_USER_AGENT)
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Login request failed: {}", e)))?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(AppError::Auth(format!("Login returned HTTP {}", status)));
        }

        let cookies = collect_cookies(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        )
        .ok_or_else(|| AppError::Auth("Login returned no session cookies".to_string()))?;

        tracing::debug!("Portal login successful");
        Ok(Credential::new(cookies))
    }
}

#[async_trait]
impl SwipeSource for PortalClient {
    async fn fetch_swipes(&self, credential: &Credential) -> Result<Vec<RawSwipe>, AppError> {
        let body = self.get_text(&self.swipes_path, credential).await?;
        parse_swipe_payload(&body)
    }

    async fn fetch_weekly(
        &self,
        credential: &Credential,
    ) -> Result<Option<Vec<DailyAggregate>>, AppError> {
        let Some(path) = &self.weekly_path else {
            return Ok(None);
        };
        let body = self.get_text(path, credential).await?;
        parse_weekly_payload(&body).map(Some)
    }
}

/// Join `Set-Cookie` values into a `Cookie` header (`name=value; ...`).
///
/// Returns `None` when no cookie was set.
pub fn collect_cookies<'a, I>(set_cookie_values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let pairs: Vec<&str> = set_cookie_values
        .into_iter()
        .filter_map(|v| v.split(';').next())
        .map(str::trim)
        .filter(|pair| pair.contains('=') && !pair.starts_with('='))
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// Parse the swipes endpoint body: a JSON array of swipe records.
pub fn parse_swipe_payload(body: &str) -> Result<Vec<RawSwipe>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::MalformedPayload("empty response body".to_string()));
    }
    serde_json::from_str(body).map_err(|e| AppError::MalformedPayload(e.to_string()))
}

/// Hours as the portal reports them, number or numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Hours {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
struct RawDailyTotal {
    #[serde(rename = "totalInTime")]
    total_in_time: Option<Hours>,
}

/// Parse the weekly endpoint body: `{ "monday": { "totalInTime": 8.2 }, ... }`.
///
/// Keys that are not tracked weekdays are skipped.
pub fn parse_weekly_payload(body: &str) -> Result<Vec<DailyAggregate>, AppError> {
    let raw: HashMap<String, RawDailyTotal> =
        serde_json::from_str(body).map_err(|e| AppError::MalformedPayload(e.to_string()))?;

    let mut days = Vec::new();
    for (key, total) in raw {
        let Ok(day) = key.parse::<WorkDay>() else {
            tracing::debug!(key = %key, "Skipping untracked weekly key");
            continue;
        };
        let hours = match total.total_in_time {
            Some(Hours::Number(h)) => h,
            Some(Hours::Text(t)) => t.trim().parse().map_err(|_| {
                AppError::MalformedPayload(format!("totalInTime for {} is not a number", key))
            })?,
            None => 0.0,
        };
        days.push(DailyAggregate {
            day,
            total_in_time_hours: hours,
        });
    }
    days.sort_by_key(|d| d.day);
    Ok(days)
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
