//! Persistence port for the gate.
//!
//! A [`FrictionStore`] holds exactly two values: the serialized event log and
//! the instant the friction screen was last shown. It carries no logic of
//! its own. [`MemoryStore`] backs tests; [`SqliteStore`] is the durable
//! implementation.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::error::StoreError;

/// Storage contract used by [`Gate`](crate::Gate).
///
/// Calls are synchronous. A single writer per installation is assumed; two
/// gates sharing one store will race.
pub trait FrictionStore {
    /// Last value passed to [`write_event_log`](Self::write_event_log), if any.
    fn read_event_log(&self) -> Result<Option<String>, StoreError>;

    /// Replace the persisted event log.
    fn write_event_log(&self, serialized: &str) -> Result<(), StoreError>;

    /// Instant recorded by the last [`mark_shown_now`](Self::mark_shown_now).
    fn read_last_shown(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Record "now" as the last-shown instant, overwriting any prior value.
    fn mark_shown_now(&self) -> Result<(), StoreError>;
}

impl<S: FrictionStore + ?Sized> FrictionStore for Box<S> {
    fn read_event_log(&self) -> Result<Option<String>, StoreError> {
        (**self).read_event_log()
    }

    fn write_event_log(&self, serialized: &str) -> Result<(), StoreError> {
        (**self).write_event_log(serialized)
    }

    fn read_last_shown(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        (**self).read_last_shown()
    }

    fn mark_shown_now(&self) -> Result<(), StoreError> {
        (**self).mark_shown_now()
    }
}

/// Returns `~/.config/frictionscreen[-dev]/` based on FRICTIONSCREEN_ENV.
///
/// Set FRICTIONSCREEN_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FRICTIONSCREEN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("frictionscreen-dev")
    } else {
        base_dir.join("frictionscreen")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
