//! In-memory store for tests and ephemeral sessions.

use chrono::{DateTime, Utc};
use std::sync::Mutex;

use super::FrictionStore;
use crate::clock::{system_clock, SharedClock};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    event_log: Option<String>,
    last_shown: Option<DateTime<Utc>>,
    event_log_writes: usize,
}

/// A [`FrictionStore`] that keeps both values in process memory.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: SharedClock,
}

impl MemoryStore {
    /// Empty store stamping "shown" instants with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(system_clock())
    }

    /// Empty store stamping "shown" instants with `clock`.
    pub fn with_clock(clock: SharedClock) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock,
        }
    }

    /// Seed the serialized event log as if a previous session wrote it.
    pub fn with_event_log(self, serialized: impl Into<String>) -> Self {
        self.lock().event_log = Some(serialized.into());
        self
    }

    /// Overwrite the last-shown instant directly.
    pub fn set_last_shown(&self, at: Option<DateTime<Utc>>) {
        self.lock().last_shown = at;
    }

    /// Number of times the event log has been written.
    pub fn event_log_writes(&self) -> usize {
        self.lock().event_log_writes
    }

    /// Raw serialized log as last written.
    pub fn raw_event_log(&self) -> Option<String> {
        self.lock().event_log.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrictionStore for MemoryStore {
    fn read_event_log(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock().event_log.clone())
    }

    fn write_event_log(&self, serialized: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.event_log = Some(serialized.to_string());
        state.event_log_writes += 1;
        Ok(())
    }

    fn read_last_shown(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self.lock().last_shown)
    }

    fn mark_shown_now(&self) -> Result<(), StoreError> {
        let now = self.clock.now();
        self.lock().last_shown = Some(now);
        Ok(())
    }
}
