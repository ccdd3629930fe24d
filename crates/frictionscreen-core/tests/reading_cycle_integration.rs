//! Integration tests for the full accumulate -> show -> cooldown cycle.
//!
//! Each "session" opens a fresh store and gate over the same SQLite file,
//! the way a host app would across launches.

use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use frictionscreen_core::{
    Clock, FrictionManager, FrictionStore, Gate, GateConfig, ManualClock, SqliteStore,
};

fn open_gate(path: &Path, clock: &ManualClock, config: &GateConfig) -> Gate<SqliteStore> {
    let store = SqliteStore::open_at(path, Arc::new(clock.clone())).unwrap();
    Gate::with_clock(store, config, Arc::new(clock.clone())).unwrap()
}

#[test]
fn test_state_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frictionscreen.db");
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let config = GateConfig::new(3, 7);

    for (session, id) in ["article-1", "article-2", "article-3"].iter().enumerate() {
        clock.advance(Duration::hours(2));
        let mut gate = open_gate(&path, &clock, &config);
        assert_eq!(gate.entries().len(), session);
        gate.record_event(id).unwrap();
        assert!(!gate.should_show_gate().unwrap());
    }

    clock.advance(Duration::hours(2));
    let mut gate = open_gate(&path, &clock, &config);
    gate.record_event("article-4").unwrap();
    assert!(gate.should_show_gate().unwrap());
    gate.mark_shown().unwrap();
    let shown_at = clock.now();

    // Next launch: empty log, cooldown marker persisted.
    clock.advance(Duration::hours(1));
    let mut gate = open_gate(&path, &clock, &config);
    assert!(gate.entries().is_empty());
    assert_eq!(
        gate.last_shown().unwrap().map(|at| at.timestamp_millis()),
        Some(shown_at.timestamp_millis())
    );

    for id in ["article-5", "article-6", "article-7", "article-8"] {
        clock.advance(Duration::hours(1));
        gate.record_event(id).unwrap();
    }
    assert!(!gate.should_show_gate().unwrap());

    clock.set(shown_at + Duration::days(7));
    let gate = open_gate(&path, &clock, &config);
    assert_eq!(gate.entries().len(), 4);
    assert!(gate.should_show_gate().unwrap());
}

#[test]
fn test_corrupt_log_on_disk_recovers_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frictionscreen.db");
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());

    {
        let store = SqliteStore::open_at(&path, Arc::new(clock.clone())).unwrap();
        store.write_event_log("definitely not json").unwrap();
    }

    let mut gate = open_gate(&path, &clock, &GateConfig::new(1, 7));
    assert!(gate.recovered_from_corrupt_log());
    assert!(gate.entries().is_empty());

    gate.record_event("article-1").unwrap();
    let reopened = open_gate(&path, &clock, &GateConfig::new(1, 7));
    assert!(!reopened.recovered_from_corrupt_log());
    assert_eq!(reopened.entries().len(), 1);
}

#[test]
fn test_manager_over_sqlite_store() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    let store = SqliteStore::open_memory(Arc::new(clock.clone())).unwrap();
    let mut manager =
        FrictionManager::with_clock(store, GateConfig::new(2, 1), Arc::new(clock.clone())).unwrap();

    for id in ["a", "b", "c"] {
        clock.advance(Duration::minutes(5));
        manager.record_event(id).unwrap();
    }
    assert!(manager.should_show());

    manager.mark_shown().unwrap();
    let status = manager.status().unwrap();
    assert_eq!(status.retained_events, 0);
    assert!(status.last_shown.is_some());
    assert!(!status.eligible);
}
