//! The qualifying-event log and its retention rule.
//!
//! An [`EventLog`] maps a caller-supplied event id to the instant it was
//! recorded. It is persisted as a JSON object of RFC 3339 timestamps:
//!
//! ```json
//! {"article-1":"2024-03-01T12:00:00.250Z","article-2":"2024-03-02T08:30:00Z"}
//! ```
//!
//! [`trim`] is the retention rule applied after every record: drop events at
//! or before the horizon, then keep the newest `cap` entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Recorded qualifying events keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<DateTime<Utc>> {
        self.entries.get(id).copied()
    }

    /// Insert an event unless the id is already present.
    ///
    /// Returns `false` when the id was already recorded; the original
    /// timestamp is kept in that case.
    pub fn insert(&mut self, id: impl Into<String>, at: DateTime<Utc>) -> bool {
        match self.entries.entry(id.into()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(at);
                true
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.entries.iter().map(|(id, at)| (id.as_str(), *at))
    }

    /// Serialize to the persisted JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted JSON form.
    ///
    /// An empty or blank string is a log that was never written and yields an
    /// empty log. Anything else must be a well-formed JSON object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_json::from_str(raw)
    }
}

impl FromIterator<(String, DateTime<Utc>)> for EventLog {
    fn from_iter<I: IntoIterator<Item = (String, DateTime<Utc>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Retain events newer than `horizon`, capped at the `cap` most recent.
///
/// Ranking is by timestamp, newest first. Entries with identical timestamps
/// are ranked by id ascending, so which one survives the cap does not depend
/// on insertion order and is stable across a save/load cycle.
pub fn trim(log: &EventLog, horizon: DateTime<Utc>, cap: usize) -> EventLog {
    let mut ranked: Vec<(&String, &DateTime<Utc>)> = log
        .entries
        .iter()
        .filter(|(_, at)| **at > horizon)
        .collect();

    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(cap);

    ranked
        .into_iter()
        .map(|(id, at)| (id.clone(), *at))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn log_of(entries: &[(&str, i64)]) -> EventLog {
        entries
            .iter()
            .map(|(id, mins)| (id.to_string(), base() + Duration::minutes(*mins)))
            .collect()
    }

    #[test]
    fn insert_is_idempotent() {
        let mut log = EventLog::new();
        assert!(log.insert("article-1", base()));
        assert!(!log.insert("article-1", base() + Duration::hours(1)));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get("article-1"), Some(base()));
    }

    #[test]
    fn empty_and_blank_strings_parse_as_empty_log() {
        assert!(EventLog::from_json("").unwrap().is_empty());
        assert!(EventLog::from_json("   \n").unwrap().is_empty());
        assert!(EventLog::from_json("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(EventLog::from_json("{not json").is_err());
        assert!(EventLog::from_json(r#"{"a":"yesterday"}"#).is_err());
        assert!(EventLog::from_json("[1,2,3]").is_err());
    }

    #[test]
    fn json_keeps_sub_second_precision() {
        let mut log = EventLog::new();
        let at = base() + Duration::nanoseconds(123_456_789);
        log.insert("article-1", at);

        let parsed = EventLog::from_json(&log.to_json().unwrap()).unwrap();
        assert_eq!(parsed.get("article-1"), Some(at));
    }

    #[test]
    fn json_shape_is_id_to_timestamp_object() {
        let log = log_of(&[("b", 0), ("a", 1)]);
        let json: serde_json::Value = serde_json::from_str(&log.to_json().unwrap()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj["a"].is_string());
    }

    #[test]
    fn trim_excludes_events_at_the_horizon() {
        let log = log_of(&[("at-horizon", 0), ("after", 1), ("before", -1)]);
        let trimmed = trim(&log, base(), 10);
        assert_eq!(trimmed.len(), 1);
        assert!(trimmed.contains("after"));
    }

    #[test]
    fn trim_keeps_most_recent_when_over_cap() {
        let log = log_of(&[("a", 1), ("b", 5), ("c", 3), ("d", 4), ("e", 2)]);
        let trimmed = trim(&log, base(), 3);
        let ids: Vec<_> = trimmed.iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, vec!["b", "c", "d"]);
    }

    #[test]
    fn trim_breaks_timestamp_ties_by_id() {
        let log = log_of(&[("zeta", 5), ("alpha", 5), ("mid", 5), ("old", 1)]);
        let trimmed = trim(&log, base(), 2);
        assert!(trimmed.contains("alpha"));
        assert!(trimmed.contains("mid"));
        assert!(!trimmed.contains("zeta"));
    }

    #[test]
    fn trim_with_zero_cap_is_empty() {
        let log = log_of(&[("a", 1)]);
        assert!(trim(&log, base(), 0).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_trim_respects_cap_and_horizon(
            offsets in prop::collection::vec(-500i64..500, 0..40),
            cap in 0usize..10,
        ) {
            let log: EventLog = offsets
                .iter()
                .enumerate()
                .map(|(i, mins)| (format!("event-{i}"), base() + Duration::minutes(*mins)))
                .collect();

            let trimmed = trim(&log, base(), cap);

            prop_assert!(trimmed.len() <= cap);
            for (id, at) in trimmed.iter() {
                prop_assert!(at > base());
                prop_assert_eq!(log.get(id), Some(at));
            }

            // Nothing dropped inside the window is newer than something kept.
            if let Some(oldest_kept) = trimmed.iter().map(|(_, at)| at).min() {
                for (id, at) in log.iter() {
                    if at > base() && !trimmed.contains(id) {
                        prop_assert!(at <= oldest_kept);
                    }
                }
            }
        }
    }
}
