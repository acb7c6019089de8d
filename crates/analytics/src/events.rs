//! Append-only in-memory event log, the substrate all analytics queries
//! read from.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use rupiya_core::types::AnalyticsEvent;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Append-only event log with per-user and per-event-name position
/// indexes maintained on insert.
///
/// Events are never updated or removed individually; `clear` drops the
/// whole log. No validation, size bound, or dedup is applied on append.
/// Index updates happen under the log's write lock, so readers that take
/// the read lock first always observe positions consistent with the log.
pub struct EventStore {
    events: RwLock<Vec<AnalyticsEvent>>,
    /// user id -> ascending positions into `events`
    by_user: DashMap<String, Vec<usize>>,
    /// event name -> ascending positions into `events`
    by_name: DashMap<String, Vec<usize>>,
}

impl EventStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            by_user: DashMap::new(),
            by_name: DashMap::new(),
        }
    }

    /// Append an event stamped with the current wall-clock time.
    pub fn record_event(
        &self,
        user_id: &str,
        event_name: &str,
        properties: HashMap<String, serde_json::Value>,
    ) {
        self.record_event_at(user_id, event_name, Utc::now(), properties);
    }

    /// Append an event with an explicit timestamp. Backfill/import path
    /// used when instrumentation flushes buffered events.
    pub fn record_event_at(
        &self,
        user_id: &str,
        event_name: &str,
        timestamp: DateTime<Utc>,
        properties: HashMap<String, serde_json::Value>,
    ) {
        let mut events = self.events.write();
        let position = events.len();
        events.push(AnalyticsEvent::new(user_id, event_name, timestamp, properties));
        self.by_user
            .entry(user_id.to_string())
            .or_default()
            .push(position);
        self.by_name
            .entry(event_name.to_string())
            .or_default()
            .push(position);
        metrics::counter!("analytics.events_recorded").increment(1);
        debug!(user_id, event_name, "Event recorded");
    }

    /// Drop the entire log and all indexes.
    pub fn clear(&self) {
        let mut events = self.events.write();
        events.clear();
        self.by_user.clear();
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Snapshot of the full log in append order.
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.read().clone()
    }

    /// All events for one user, in append order.
    pub fn events_for_user(&self, user_id: &str) -> Vec<AnalyticsEvent> {
        let events = self.events.read();
        match self.by_user.get(user_id) {
            Some(positions) => positions
                .iter()
                .filter_map(|&p| events.get(p).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// All events with the given name, in append order.
    pub fn events_named(&self, event_name: &str) -> Vec<AnalyticsEvent> {
        let events = self.events.read();
        match self.by_name.get(event_name) {
            Some(positions) => positions
                .iter()
                .filter_map(|&p| events.get(p).cloned())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Distinct user ids in order of first appearance in the log.
    pub fn distinct_users(&self) -> Vec<String> {
        let _events = self.events.read();
        let mut users: Vec<(String, usize)> = self
            .by_user
            .iter()
            .filter_map(|entry| {
                entry
                    .value()
                    .first()
                    .map(|&first| (entry.key().clone(), first))
            })
            .collect();
        users.sort_by_key(|(_, first)| *first);
        users.into_iter().map(|(user, _)| user).collect()
    }

    pub fn distinct_user_count(&self) -> usize {
        let _events = self.events.read();
        self.by_user.len()
    }

    /// Distinct users who ever fired the given event, in order of first
    /// occurrence of the event.
    pub fn users_for_event(&self, event_name: &str) -> Vec<String> {
        let events = self.events.read();
        let positions = match self.by_name.get(event_name) {
            Some(p) => p.clone(),
            None => return Vec::new(),
        };
        let mut seen = HashSet::new();
        let mut users = Vec::new();
        for position in positions {
            if let Some(event) = events.get(position) {
                if seen.insert(event.user_id.clone()) {
                    users.push(event.user_id.clone());
                }
            }
        }
        users
    }

    /// Event counts keyed by event name.
    pub fn event_name_counts(&self) -> HashMap<String, u64> {
        let _events = self.events.read();
        self.by_name
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().len() as u64))
            .collect()
    }

    /// Event counts keyed by user id.
    pub fn user_event_counts(&self) -> HashMap<String, u64> {
        let _events = self.events.read();
        self.by_user
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().len() as u64))
            .collect()
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(store: &EventStore, user: &str, name: &str) {
        store.record_event(user, name, HashMap::new());
    }

    // 1. Append and lookup --------------------------------------------------

    #[test]
    fn test_record_and_lookup() {
        let store = EventStore::new();
        record(&store, "u1", "login");
        record(&store, "u2", "login");
        record(&store, "u1", "expense_added");

        assert_eq!(store.len(), 3);
        assert_eq!(store.events_for_user("u1").len(), 2);
        assert_eq!(store.events_named("login").len(), 2);
        assert_eq!(store.events_for_user("unknown").len(), 0);
        assert_eq!(store.events_named("unknown").len(), 0);
    }

    #[test]
    fn test_distinct_users_first_appearance_order() {
        let store = EventStore::new();
        record(&store, "u3", "login");
        record(&store, "u1", "login");
        record(&store, "u3", "expense_added");
        record(&store, "u2", "login");

        assert_eq!(store.distinct_users(), vec!["u3", "u1", "u2"]);
        assert_eq!(store.distinct_user_count(), 3);
    }

    #[test]
    fn test_users_for_event_distinct() {
        let store = EventStore::new();
        record(&store, "u1", "expense_added");
        record(&store, "u2", "expense_added");
        record(&store, "u1", "expense_added");

        assert_eq!(store.users_for_event("expense_added"), vec!["u1", "u2"]);
    }

    // 2. Backfill path ------------------------------------------------------

    #[test]
    fn test_record_event_at_keeps_explicit_timestamp() {
        let store = EventStore::new();
        let then = Utc::now() - Duration::days(10);
        store.record_event_at("u1", "login", then, HashMap::new());

        let events = store.events_for_user("u1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, then);
    }

    // 3. Clear --------------------------------------------------------------

    #[test]
    fn test_clear_resets_everything() {
        let store = EventStore::new();
        record(&store, "u1", "login");
        record(&store, "u2", "login");

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.distinct_user_count(), 0);
        assert!(store.events_named("login").is_empty());
        assert!(store.users_for_event("login").is_empty());
    }

    // 4. Counts -------------------------------------------------------------

    #[test]
    fn test_counts() {
        let store = EventStore::new();
        record(&store, "u1", "login");
        record(&store, "u1", "login");
        record(&store, "u2", "expense_added");

        let by_name = store.event_name_counts();
        assert_eq!(by_name.get("login"), Some(&2));
        assert_eq!(by_name.get("expense_added"), Some(&1));

        let by_user = store.user_event_counts();
        assert_eq!(by_user.get("u1"), Some(&2));
        assert_eq!(by_user.get("u2"), Some(&1));
    }
}
