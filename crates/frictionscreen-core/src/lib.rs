//! # Frictionscreen Core Library
//!
//! Decides when to interrupt a user with a friction screen (for example a
//! premium purchase prompt) after they have performed a qualifying action a
//! configurable number of times within a trailing window, and keeps the
//! screen away until a cooldown has elapsed since it was last shown.
//!
//! ## Architecture
//!
//! - **Gate**: in-memory event log, trimming rule and cooldown check
//! - **Store**: persistence port with in-memory and SQLite implementations
//! - **Manager**: composes the gate with host conditions such as connectivity
//! - **Config**: TOML policy parameters
//!
//! ## Key Components
//!
//! - [`Gate`]: record events, decide, mark shown
//! - [`FrictionStore`]: the four-operation storage contract
//! - [`FrictionManager`]: what a UI layer talks to
//! - [`Clock`]: injectable time source

pub mod clock;
pub mod config;
pub mod error;
pub mod event_log;
pub mod gate;
pub mod manager;
pub mod store;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::GateConfig;
pub use error::{ConfigError, CoreError, StoreError};
pub use event_log::{trim, EventLog};
pub use gate::{days_between, Gate};
pub use manager::{AlwaysOnline, Connectivity, FrictionManager, GateStatus};
pub use store::{FrictionStore, MemoryStore, SqliteStore};
