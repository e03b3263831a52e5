// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite status store with typed operations.
//!
//! Provides:
//! - Status (the single live status row, upserted every refresh)
//! - Weekly (per-weekday totals, replaced wholesale)
//!
//! Schema evolution is additive and version-free: on every startup each
//! optional status column is added if it is missing.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::db::tables;
use crate::error::AppError;
use crate::models::status::DEFAULT_TARGET_END_TIME;
use crate::models::{DailyAggregate, InOut, StatusRecord};
use crate::time_utils::{format_hours, format_utc_rfc3339};

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Tables as first shipped; newer status columns are added below.
const BASE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS status (
    id            INTEGER PRIMARY KEY CHECK (id = 1),
    totalHours    TEXT,
    currentStatus INTEGER
);

CREATE TABLE IF NOT EXISTS weekly (
    day         TEXT PRIMARY KEY,
    totalInTime REAL NOT NULL DEFAULT 0
);
"#;

/// Optional status columns and their declarations, in the order added.
const OPTIONAL_STATUS_COLUMNS: [(&str, &str); 7] = [
    ("estimatedCompletionTime", "TEXT DEFAULT ''"),
    ("bufferTime", "TEXT DEFAULT ''"),
    ("targetEndTime", "TEXT DEFAULT '18:30'"),
    ("totalHoursRaw", "REAL DEFAULT 0"),
    ("lastUpdatedAt", "TEXT DEFAULT ''"),
    ("inTime", "TEXT DEFAULT ''"),
    ("lastOut", "TEXT DEFAULT ''"),
];

const SEED_STATUS: &str = r#"
INSERT OR IGNORE INTO status (
    id, totalHours, totalHoursRaw, currentStatus, estimatedCompletionTime,
    bufferTime, targetEndTime, lastUpdatedAt, inTime, lastOut
) VALUES (1, '00:00', 0, 0, '', '', '18:30', '', '', '')
"#;

const SELECT_STATUS: &str = r#"
SELECT totalHours, totalHoursRaw, currentStatus, estimatedCompletionTime,
       bufferTime, targetEndTime, lastUpdatedAt, inTime, lastOut
FROM status WHERE id = 1
"#;

const UPSERT_STATUS: &str = r#"
INSERT INTO status (
    id, totalHours, totalHoursRaw, currentStatus, estimatedCompletionTime,
    bufferTime, targetEndTime, lastUpdatedAt, inTime, lastOut
) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
ON CONFLICT(id) DO UPDATE SET
    totalHours = excluded.totalHours,
    totalHoursRaw = excluded.totalHoursRaw,
    currentStatus = excluded.currentStatus,
    estimatedCompletionTime = excluded.estimatedCompletionTime,
    bufferTime = excluded.bufferTime,
    targetEndTime = excluded.targetEndTime,
    lastUpdatedAt = excluded.lastUpdatedAt,
    inTime = excluded.inTime,
    lastOut = excluded.lastOut
"#;

/// SQLite status store.
///
/// Cheap to clone; all clones share one connection. Every operation runs on
/// the blocking pool and holds the connection only for its own statements.
#[derive(Clone)]
pub struct StatusDb {
    conn: Arc<Mutex<Connection>>,
}

impl StatusDb {
    /// Open (or create) a database file and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        tracing::info!(path = %path.display(), journal_mode = %mode, "Opened status database");
        Self::from_connection(conn)
    }

    /// In-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init()?;
        Ok(db)
    }

    /// Create missing tables and columns and seed the status row.
    ///
    /// Idempotent: running it again never duplicates the row or resets
    /// stored values.
    pub fn init(&self) -> Result<(), AppError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute_batch(BASE_SCHEMA)?;

        let existing = column_names(&tx, tables::STATUS)?;
        for (name, decl) in OPTIONAL_STATUS_COLUMNS {
            if !existing.contains(name) {
                tx.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    tables::STATUS,
                    name,
                    decl
                ))?;
                tracing::info!(column = name, "Added status column");
            }
        }

        let seeded = tx.execute(SEED_STATUS, [])?;
        if seeded > 0 {
            tracing::info!("Seeded default status row");
        }

        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|_| AppError::Database("status database lock poisoned".to_string()))
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Connection) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| AppError::Database("status database lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| AppError::Internal(e.into()))?
    }

    // ─── Status Operations ───────────────────────────────────────

    /// Read the status row.
    pub async fn get_status(&self) -> Result<StatusRecord, AppError> {
        self.with_conn(|conn| {
            conn.query_row(SELECT_STATUS, [], status_from_row)
                .optional()?
                .ok_or_else(|| AppError::Database("status row missing".to_string()))
        })
        .await
    }

    /// Read the status row, substituting the default record on any failure.
    pub async fn get_status_or_default(&self) -> StatusRecord {
        match self.get_status().await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Status read failed, serving default record");
                StatusRecord::default()
            }
        }
    }

    /// Write every field of the status row.
    pub async fn upsert_status(&self, record: StatusRecord) -> Result<(), AppError> {
        self.with_conn(move |conn| {
            write_status(conn, &record)?;
            Ok(())
        })
        .await
    }

    /// Recompute the status row in one transaction.
    ///
    /// `compute` receives the stored target end time and returns the new
    /// record, so a concurrent target update is never lost.
    pub async fn refresh_status<F>(&self, compute: F) -> Result<StatusRecord, AppError>
    where
        F: FnOnce(&str) -> StatusRecord + Send + 'static,
    {
        self.with_conn(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let target: Option<Value> = tx
                .query_row("SELECT targetEndTime FROM status WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            let target = target
                .and_then(text_value)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TARGET_END_TIME.to_string());

            let record = compute(&target);
            write_status(&tx, &record)?;
            tx.commit()?;
            Ok(record)
        })
        .await
    }

    /// Persist a new target end time, leaving every other field alone.
    pub async fn set_target_end_time(&self, time: String) -> Result<(), AppError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(SEED_STATUS, [])?;
            tx.execute(
                "UPDATE status SET targetEndTime = ?1 WHERE id = 1",
                params![time],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    // ─── Weekly Operations ───────────────────────────────────────

    /// All stored weekday totals, Monday first.
    pub async fn get_weekly(&self) -> Result<Vec<DailyAggregate>, AppError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT day, totalInTime FROM weekly")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?;

            let mut days = Vec::new();
            for row in rows {
                let (day, hours) = row?;
                match day.parse() {
                    Ok(day) => days.push(DailyAggregate {
                        day,
                        total_in_time_hours: hours,
                    }),
                    Err(e) => tracing::warn!(error = %e, "Ignoring unknown weekly row"),
                }
            }
            days.sort_by_key(|d| d.day);
            Ok(days)
        })
        .await
    }

    /// Replace all weekday totals.
    pub async fn replace_weekly(&self, days: Vec<DailyAggregate>) -> Result<(), AppError> {
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(&format!("DELETE FROM {}", tables::WEEKLY), [])?;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR REPLACE INTO weekly (day, totalInTime) VALUES (?1, ?2)",
                )?;
                for day in &days {
                    stmt.execute(params![day.day.as_str(), day.total_in_time_hours])?;
                }
            }
            tx.commit()?;
            tracing::debug!(days = days.len(), "Weekly totals replaced");
            Ok(())
        })
        .await
    }
}

fn column_names(conn: &Connection, table: &str) -> Result<HashSet<String>, AppError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut names = HashSet::new();
    for c in cols {
        names.insert(c?);
    }
    Ok(names)
}

fn write_status(conn: &Connection, record: &StatusRecord) -> Result<(), AppError> {
    conn.execute(
        UPSERT_STATUS,
        params![
            record.total_hours_formatted,
            record.total_hours_raw,
            record.current_status.as_db_int(),
            record.estimated_completion_time,
            record.buffer_time,
            record.target_end_time,
            record
                .last_updated_at
                .map(format_utc_rfc3339)
                .unwrap_or_default(),
            record.in_time,
            record.last_out,
        ],
    )?;
    Ok(())
}

/// Map the status row, tolerating legacy column types and NULLs.
fn status_from_row(row: &Row<'_>) -> rusqlite::Result<StatusRecord> {
    let total_hours = match row.get::<_, Value>(0)? {
        Value::Real(h) => format_hours(h),
        Value::Integer(h) => format_hours(h as f64),
        other => text_value(other).unwrap_or_else(|| "00:00".to_string()),
    };
    let total_hours_raw = match row.get::<_, Value>(1)? {
        Value::Real(h) => h,
        Value::Integer(h) => h as f64,
        Value::Text(t) => t.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    let current_status = match row.get::<_, Value>(2)? {
        Value::Integer(v) => InOut::from_db_int(v),
        Value::Text(t) if t.trim() == "1" || t.trim().eq_ignore_ascii_case("IN") => InOut::In,
        _ => InOut::Out,
    };
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(text_value(row.get::<_, Value>(idx)?).unwrap_or_default())
    };

    Ok(StatusRecord {
        total_hours_formatted: total_hours,
        total_hours_raw,
        current_status,
        estimated_completion_time: text(3)?,
        buffer_time: text(4)?,
        target_end_time: text(5)?,
        last_updated_at: DateTime::parse_from_rfc3339(&text(6)?)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        in_time: text(7)?,
        last_out: text(8)?,
    })
}

fn text_value(value: Value) -> Option<String> {
    match value {
        Value::Text(t) => Some(t),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}
