//! Read recorder and friction-screen decision engine.
//!
//! The gate counts qualifying events (article reads, button presses) inside a
//! trailing window of `cooldown_days`. Once more than `read_threshold` events
//! are retained the screen becomes eligible; after it is shown, the count
//! resets and the screen stays suppressed until `cooldown_days` have passed
//! since that display.
//!
//! ## Lifecycle
//!
//! - **Accumulating**: retained count <= threshold
//! - **Eligible**: count > threshold and cooldown elapsed (or never shown)
//! - **Cooldown**: shown recently; the log was cleared by [`Gate::mark_shown`]
//!   and refills from zero, but display waits for the cooldown to run out
//!
//! ## Concurrency
//!
//! A gate owns its in-memory snapshot of the log. Two gates over one store
//! (threads or processes) will overwrite each other's writes; one writer per
//! installation is assumed and no locking is provided.

use chrono::{DateTime, Duration, Utc};

use crate::clock::{system_clock, SharedClock};
use crate::config::GateConfig;
use crate::error::Result;
use crate::event_log::{self, EventLog};
use crate::store::FrictionStore;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole 24-hour periods from `earlier` to `later`, rounded toward negative
/// infinity. 23h59m is 0 days, exactly 24h is 1 day, and any instant after
/// `later` gives a negative count.
pub fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Recorder and decision engine for the friction screen.
pub struct Gate<S> {
    store: S,
    clock: SharedClock,
    read_threshold: u32,
    cooldown_days: u32,
    enabled: bool,
    entries: EventLog,
    recovered_from_corrupt_log: bool,
}

impl<S: FrictionStore> Gate<S> {
    /// Create a gate on the wall clock, loading the event log from `store`.
    ///
    /// # Errors
    /// Fails if `config` is invalid or the store cannot be read.
    pub fn new(store: S, config: &GateConfig) -> Result<Self> {
        Self::with_clock(store, config, system_clock())
    }

    /// Create a gate with an explicit time source.
    ///
    /// A stored log that is present but unparsable is discarded and the gate
    /// starts empty; see [`recovered_from_corrupt_log`](Self::recovered_from_corrupt_log).
    pub fn with_clock(store: S, config: &GateConfig, clock: SharedClock) -> Result<Self> {
        config.validate()?;

        let mut recovered_from_corrupt_log = false;
        let entries = match store.read_event_log()? {
            None => EventLog::new(),
            Some(raw) => match EventLog::from_json(&raw) {
                Ok(log) => log,
                Err(e) => {
                    tracing::warn!(
                        "Discarding corrupt event log ({} bytes): {}",
                        raw.len(),
                        e
                    );
                    recovered_from_corrupt_log = true;
                    EventLog::new()
                }
            },
        };

        tracing::debug!(
            "Gate loaded with {} retained events (threshold {}, cooldown {} days)",
            entries.len(),
            config.read_threshold,
            config.cooldown_days
        );

        Ok(Self {
            store,
            clock,
            read_threshold: config.read_threshold,
            cooldown_days: config.cooldown_days,
            enabled: config.enabled,
            entries,
            recovered_from_corrupt_log,
        })
    }

    /// Record a qualifying event.
    ///
    /// Ids already in the log are ignored. Otherwise the event is stamped
    /// with the current time, the log is trimmed to the window and capped at
    /// `read_threshold + 1` entries, and the result is persisted.
    ///
    /// # Errors
    /// Returns the store's write error. The in-memory log keeps the update
    /// even when persisting fails.
    pub fn record_event(&mut self, id: &str) -> Result<()> {
        if !self.enabled || self.entries.contains(id) {
            return Ok(());
        }

        let now = self.clock.now();
        self.entries.insert(id, now);
        self.entries = event_log::trim(&self.entries, self.horizon_at(now), self.retention_cap());

        tracing::debug!("Recorded event {}; {} retained", id, self.entries.len());

        self.persist()
    }

    /// Whether the friction screen should be displayed now.
    ///
    /// Read-only. Connectivity and other host-level gates are applied by the
    /// caller, e.g. [`FrictionManager`](crate::FrictionManager).
    ///
    /// # Errors
    /// Returns the store's error if the last-shown instant cannot be read.
    pub fn should_show_gate(&self) -> Result<bool> {
        if !self.enabled || !self.threshold_met() {
            return Ok(false);
        }

        let Some(last_shown) = self.store.read_last_shown()? else {
            return Ok(true);
        };

        let days_since = days_between(self.clock.now(), last_shown);
        let show = days_since >= i64::from(self.cooldown_days);
        tracing::debug!(
            "Last shown {} days ago (cooldown {}): show = {}",
            days_since,
            self.cooldown_days,
            show
        );
        Ok(show)
    }

    /// Record that the friction screen was shown and restart the count.
    ///
    /// # Errors
    /// Returns the first store error. If stamping the display fails the log
    /// is left untouched.
    pub fn mark_shown(&mut self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        self.store.mark_shown_now()?;
        self.entries.clear();
        tracing::info!("Friction screen marked as shown; event log reset");
        self.persist()
    }

    /// Retained count exceeds the threshold.
    pub fn threshold_met(&self) -> bool {
        self.entries.len() > self.read_threshold as usize
    }

    /// Events at or before this instant are dropped on the next record.
    pub fn horizon(&self) -> DateTime<Utc> {
        self.horizon_at(self.clock.now())
    }

    pub fn last_shown(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.store.read_last_shown()?)
    }

    pub fn entries(&self) -> &EventLog {
        &self.entries
    }

    pub fn read_threshold(&self) -> u32 {
        self.read_threshold
    }

    pub fn cooldown_days(&self) -> u32 {
        self.cooldown_days
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True when construction found a stored log it could not parse.
    pub fn recovered_from_corrupt_log(&self) -> bool {
        self.recovered_from_corrupt_log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Clamped to the earliest representable instant for very long windows.
    fn horizon_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_days(i64::from(self.cooldown_days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn retention_cap(&self) -> usize {
        self.read_threshold as usize + 1
    }

    fn persist(&self) -> Result<()> {
        let serialized = self.entries.to_json()?;
        self.store.write_event_log(&serialized)?;
        Ok(())
    }
}
