//! Simulated reading sessions against an in-memory SQLite store.
//!
//! A reader opens one article a day; the premium screen appears once the
//! threshold is passed, then stays away for the cooldown.
//!
//! Run with `RUST_LOG=frictionscreen_core=debug cargo run --example reading_session`.

use std::sync::Arc;

use frictionscreen_core::{FrictionManager, GateConfig, ManualClock, SqliteStore};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock = ManualClock::starting_now();
    let store = SqliteStore::open_memory(Arc::new(clock.clone()))?;
    let config = GateConfig::new(3, 7);
    let mut manager = FrictionManager::with_clock(store, config, Arc::new(clock.clone()))?;

    for day in 1..=21 {
        clock.advance_days(1);
        manager.record_event(&format!("article-{day}"))?;

        if manager.should_show() {
            println!("day {day:>2}: showing premium screen");
            manager.mark_shown()?;
        } else {
            let status = manager.status()?;
            println!(
                "day {day:>2}: {} of {} reads counted",
                status.retained_events,
                status.read_threshold + 1
            );
        }
    }

    Ok(())
}
