//! Host-facing wrapper around a [`Gate`].
//!
//! The gate only answers "has the user read enough, and has the cooldown
//! elapsed". A host additionally cares whether the device is online before
//! interrupting with a purchase screen. [`FrictionManager`] composes the two
//! and never lets a store failure turn into a displayed screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::config::GateConfig;
use crate::error::Result;
use crate::gate::Gate;
use crate::store::FrictionStore;

/// Reachability probe supplied by the host.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Probe that always reports a connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

impl<F> Connectivity for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_online(&self) -> bool {
        self()
    }
}

/// Snapshot of the gate for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    pub enabled: bool,
    pub retained_events: usize,
    pub read_threshold: u32,
    pub cooldown_days: u32,
    pub last_shown: Option<DateTime<Utc>>,
    pub eligible: bool,
}

/// Gate plus the host-level conditions around it.
pub struct FrictionManager<S> {
    config: GateConfig,
    gate: Gate<S>,
    connectivity: Box<dyn Connectivity>,
}

impl<S: FrictionStore> FrictionManager<S> {
    /// Build a manager on the wall clock with an always-online probe.
    pub fn new(store: S, config: GateConfig) -> Result<Self> {
        let gate = Gate::new(store, &config)?;
        Ok(Self {
            config,
            gate,
            connectivity: Box::new(AlwaysOnline),
        })
    }

    /// Build a manager with an explicit clock.
    pub fn with_clock(store: S, config: GateConfig, clock: SharedClock) -> Result<Self> {
        let gate = Gate::with_clock(store, &config, clock)?;
        Ok(Self {
            config,
            gate,
            connectivity: Box::new(AlwaysOnline),
        })
    }

    /// Replace the connectivity probe.
    pub fn with_connectivity(mut self, probe: impl Connectivity + 'static) -> Self {
        self.connectivity = Box::new(probe);
        self
    }

    /// Record a qualifying action such as reading an article.
    pub fn record_event(&mut self, id: &str) -> Result<()> {
        self.gate.record_event(id)
    }

    /// Whether the host should display the friction screen now.
    ///
    /// Errors from the store are logged and answered with `false`.
    pub fn should_show(&self) -> bool {
        if !self.config.enabled {
            return false;
        }
        if self.config.require_connectivity && !self.connectivity.is_online() {
            tracing::debug!("Friction screen withheld: offline");
            return false;
        }
        match self.gate.should_show_gate() {
            Ok(show) => show,
            Err(e) => {
                tracing::warn!("Could not evaluate friction gate: {}", e);
                false
            }
        }
    }

    /// Call after the friction screen has been displayed.
    pub fn mark_shown(&mut self) -> Result<()> {
        self.gate.mark_shown()
    }

    pub fn status(&self) -> Result<GateStatus> {
        Ok(GateStatus {
            enabled: self.config.enabled,
            retained_events: self.gate.entries().len(),
            read_threshold: self.config.read_threshold,
            cooldown_days: self.config.cooldown_days,
            last_shown: self.gate.last_shown()?,
            eligible: self.gate.should_show_gate()?,
        })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn gate(&self) -> &Gate<S> {
        &self.gate
    }
}
