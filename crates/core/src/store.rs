// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed persistent queue store.
//!
//! The [`QueueStore`] keeps one row per pending request. Rows are created by
//! [`QueueStore::add`], re-stamped by [`QueueStore::update`] after a failed
//! delivery, and deleted by [`QueueStore::remove`] once delivered or
//! abandoned. Every operation is atomic at the single-row grain; SQLite
//! locking serializes the CLI and the worker daemon when both touch the same
//! file.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;

use crate::clock::{ClockSource, SystemClock};
use crate::error::{Error, Result};
use crate::request::{Method, NewRequest, QueuedRequest, RequestId};

/// SQL schema for the request queue.
pub const SCHEMA: &str = r#"
-- Pending outbound requests; AUTOINCREMENT keeps ids from being reused
CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    method TEXT NOT NULL DEFAULT 'GET',
    headers TEXT NOT NULL DEFAULT '{}',
    body TEXT,
    enqueued_at INTEGER NOT NULL,         -- ms since epoch
    attempts INTEGER NOT NULL DEFAULT 0 CHECK (attempts >= 0),
    next_retry_at INTEGER                 -- ms since epoch, NULL = eligible now
);

CREATE INDEX IF NOT EXISTS idx_requests_order ON requests(enqueued_at, id);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, url, method, headers, body, enqueued_at, attempts, next_retry_at FROM requests";

/// Queue depth summary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QueueStats {
    /// All stored requests.
    pub total: usize,
    /// Requests whose retry time has elapsed (or was never set).
    pub eligible: usize,
    /// Requests waiting for their retry time.
    pub waiting: usize,
    /// Creation time of the oldest stored request.
    pub oldest_enqueued_at: Option<DateTime<Utc>>,
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Convert a millisecond timestamp from the database.
fn parse_timestamp(
    value: i64,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::from_timestamp_millis(value)
        .ok_or_else(|| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn parse_headers(value: &str) -> std::result::Result<BTreeMap<String, String>, rusqlite::Error> {
    serde_json::from_str(value).map_err(|_| corrupted(format!("invalid headers '{value}'")))
}

fn row_to_request(row: &rusqlite::Row) -> std::result::Result<QueuedRequest, rusqlite::Error> {
    let method: String = row.get(2)?;
    let headers: String = row.get(3)?;
    let enqueued_at: i64 = row.get(5)?;
    let next_retry_at: Option<i64> = row.get(7)?;

    Ok(QueuedRequest {
        id: RequestId(row.get(0)?),
        url: row.get(1)?,
        method: parse_db::<Method>(&method, "method")?,
        headers: parse_headers(&headers)?,
        body: row.get(4)?,
        enqueued_at: parse_timestamp(enqueued_at, "enqueued_at")?,
        attempts: row.get(6)?,
        next_retry_at: next_retry_at
            .map(|ms| parse_timestamp(ms, "next_retry_at"))
            .transpose()?,
    })
}

/// Run schema creation and all migrations on a queue connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    migrate_add_next_retry_at(conn)?;
    Ok(())
}

/// Migration: queue files created before retry scheduling lack `next_retry_at`.
fn migrate_add_next_retry_at(conn: &Connection) -> Result<()> {
    let has_column: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM pragma_table_info('requests') WHERE name = 'next_retry_at'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if !has_column {
        conn.execute("ALTER TABLE requests ADD COLUMN next_retry_at INTEGER", [])?;
    }
    Ok(())
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(format!("{context}: {err}"))
}

/// Durable, ordered store of pending requests.
pub struct QueueStore<C: ClockSource = SystemClock> {
    conn: Mutex<Connection>,
    clock: C,
}

impl QueueStore<SystemClock> {
    /// Open or create a queue store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_clock(path, SystemClock)
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_clock(SystemClock)
    }
}

impl<C: ClockSource> QueueStore<C> {
    /// Open or create a queue store that stamps records with a custom clock.
    ///
    /// Any failure to create the directory, open the file, or apply the
    /// schema is reported as [`Error::StoreUnavailable`].
    pub fn open_with_clock(path: &Path, clock: C) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| unavailable(&parent.display().to_string(), e))?;
            }
        }

        let context = path.display().to_string();
        let conn = Connection::open(path).map_err(|e| unavailable(&context, e))?;

        // WAL for concurrent readers, FULL sync so a committed add survives a crash
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| unavailable(&context, e))?;
        run_migrations(&conn).map_err(|e| unavailable(&context, e))?;

        Ok(QueueStore {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// Open an in-memory store with a custom clock (for testing).
    pub fn open_in_memory_with_clock(clock: C) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(QueueStore {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Insert a new request.
    ///
    /// Assigns the id and creation time and starts `attempts` at zero. The
    /// row is committed before this returns; if it cannot be written the
    /// request is not queued and [`Error::StoreUnavailable`] is returned.
    pub fn add(&self, request: &NewRequest) -> Result<QueuedRequest> {
        let enqueued_at = self.clock.now();
        let headers = serde_json::to_string(&request.headers)?;

        let conn = self.lock();
        conn.execute(
            "INSERT INTO requests (url, method, headers, body, enqueued_at, attempts, next_retry_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL)",
            params![
                request.url,
                request.method.as_str(),
                headers,
                request.body,
                enqueued_at.timestamp_millis(),
            ],
        )
        .map_err(|e| unavailable("insert", e))?;
        let id = RequestId(conn.last_insert_rowid());

        Ok(QueuedRequest {
            id,
            url: request.url.clone(),
            method: request.method,
            headers: request.headers.clone(),
            body: request.body.clone(),
            enqueued_at,
            attempts: 0,
            next_retry_at: None,
        })
    }

    /// Get a single request by id.
    pub fn get(&self, id: RequestId) -> Result<Option<QueuedRequest>> {
        let conn = self.lock();
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        Ok(conn.query_row(&sql, [id.0], row_to_request).optional()?)
    }

    /// Get up to `limit` requests, oldest first.
    ///
    /// Ordering is by creation time, ties broken by id. Retry times do not
    /// affect ordering. An empty queue yields an empty vector.
    pub fn get_oldest(&self, limit: usize) -> Result<Vec<QueuedRequest>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.lock();
        let sql = format!("{SELECT_COLUMNS} ORDER BY enqueued_at, id LIMIT ?1");
        let mut stmt = conn.prepare(&sql)?;
        let requests = stmt
            .query_map([limit], row_to_request)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(requests)
    }

    /// Get every stored request, oldest first.
    pub fn get_all(&self) -> Result<Vec<QueuedRequest>> {
        self.get_oldest(usize::MAX)
    }

    /// Delete a request. Deleting a missing id is not an error.
    ///
    /// Returns true if a row was deleted.
    pub fn remove(&self, id: RequestId) -> Result<bool> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM requests WHERE id = ?1", [id.0])?;
        Ok(deleted > 0)
    }

    /// Atomically read, modify, and write back a single request.
    ///
    /// Returns `Ok(None)` if the request no longer exists. The id and
    /// creation time cannot be changed through `mutate`, and lowering
    /// `attempts` is rejected with [`Error::AttemptsDecreased`].
    pub fn update<F>(&self, id: RequestId, mutate: F) -> Result<Option<QueuedRequest>>
    where
        F: FnOnce(&mut QueuedRequest),
    {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let Some(current) = tx.query_row(&sql, [id.0], row_to_request).optional()? else {
            return Ok(None);
        };

        let mut next = current.clone();
        mutate(&mut next);
        next.id = current.id;
        next.enqueued_at = current.enqueued_at;

        if next.attempts < current.attempts {
            return Err(Error::AttemptsDecreased {
                id,
                from: current.attempts,
                to: next.attempts,
            });
        }

        let headers = serde_json::to_string(&next.headers)?;
        tx.execute(
            "UPDATE requests SET url = ?1, method = ?2, headers = ?3, body = ?4,
             attempts = ?5, next_retry_at = ?6 WHERE id = ?7",
            params![
                next.url,
                next.method.as_str(),
                headers,
                next.body,
                next.attempts,
                next.next_retry_at.map(|t| t.timestamp_millis()),
                id.0,
            ],
        )?;
        tx.commit()?;

        Ok(Some(next))
    }

    /// Remove every request. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let conn = self.lock();
        Ok(conn.execute("DELETE FROM requests", [])?)
    }

    /// Number of stored requests.
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM requests", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Summarize queue depth as of `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> Result<QueueStats> {
        let conn = self.lock();
        let (total, eligible, oldest): (i64, Option<i64>, Option<i64>) = conn.query_row(
            "SELECT COUNT(*),
                    SUM(CASE WHEN next_retry_at IS NULL OR next_retry_at <= ?1 THEN 1 ELSE 0 END),
                    MIN(enqueued_at)
             FROM requests",
            [now.timestamp_millis()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let total = total as usize;
        let eligible = eligible.unwrap_or(0) as usize;
        Ok(QueueStats {
            total,
            eligible,
            waiting: total - eligible,
            oldest_enqueued_at: oldest
                .map(|ms| parse_timestamp(ms, "enqueued_at"))
                .transpose()?,
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
