//! SQLite-backed store.
//!
//! Both values live in a two-column key-value table:
//! - `event_log`: the serialized event log
//! - `last_shown_at`: epoch milliseconds of the last display

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{data_dir, FrictionStore};
use crate::clock::{system_clock, SharedClock};
use crate::error::StoreError;

const KEY_EVENT_LOG: &str = "event_log";
const KEY_LAST_SHOWN: &str = "last_shown_at";

/// Durable [`FrictionStore`] on a SQLite database file.
pub struct SqliteStore {
    conn: Connection,
    clock: SharedClock,
}

impl SqliteStore {
    /// Open the store at `~/.config/frictionscreen/frictionscreen.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("frictionscreen.db");
        Self::open_at(&path, system_clock())
    }

    /// Open (or create) a store at an explicit path.
    pub fn open_at(path: &Path, clock: SharedClock) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn, clock };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database.
    pub fn open_memory(clock: SharedClock) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, clock };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl FrictionStore for SqliteStore {
    fn read_event_log(&self) -> Result<Option<String>, StoreError> {
        self.kv_get(KEY_EVENT_LOG)
    }

    fn write_event_log(&self, serialized: &str) -> Result<(), StoreError> {
        self.kv_set(KEY_EVENT_LOG, serialized)
    }

    fn read_last_shown(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let Some(raw) = self.kv_get(KEY_LAST_SHOWN)? else {
            return Ok(None);
        };

        let millis: i64 = raw.trim().parse().map_err(|_| StoreError::CorruptValue {
            key: KEY_LAST_SHOWN.to_string(),
            message: format!("expected epoch milliseconds, got '{raw}'"),
        })?;

        // Non-positive timestamps are the "never shown" sentinel.
        if millis <= 0 {
            return Ok(None);
        }

        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Some)
            .ok_or_else(|| StoreError::CorruptValue {
                key: KEY_LAST_SHOWN.to_string(),
                message: format!("timestamp {millis} out of range"),
            })
    }

    fn mark_shown_now(&self) -> Result<(), StoreError> {
        let now = self.clock.now();
        self.kv_set(KEY_LAST_SHOWN, &now.timestamp_millis().to_string())
    }
}
