//! Distribution and ranking queries over the event log.

use rupiya_core::types::{AnalyticsEvent, UserActivity};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub struct ActivityAggregator {
    store: Arc<super::EventStore>,
}

impl ActivityAggregator {
    pub fn new(store: Arc<super::EventStore>) -> Self {
        Self { store }
    }

    /// Event counts per event name over the whole log.
    pub fn event_distribution(&self) -> HashMap<String, u64> {
        self.store.event_name_counts()
    }

    /// One user's events, ascending by timestamp.
    pub fn user_journey(&self, user_id: &str) -> Vec<AnalyticsEvent> {
        let mut events = self.store.events_for_user(user_id);
        events.sort_by_key(|event| event.timestamp);
        events
    }

    /// Users ranked by event count, descending, ties broken by user id.
    pub fn top_users_by_activity(&self, limit: usize) -> Vec<UserActivity> {
        let mut ranked: Vec<UserActivity> = self
            .store
            .user_event_counts()
            .into_iter()
            .map(|(user_id, event_count)| UserActivity {
                user_id,
                event_count,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.event_count
                .cmp(&a.event_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        ranked.truncate(limit);
        ranked
    }

    pub fn top_users(&self) -> Vec<UserActivity> {
        self.top_users_by_activity(10)
    }

    /// Distinct users who ever fired `event_name` as an integer
    /// percentage of all distinct users. Returns 0 when the log is empty.
    pub fn feature_adoption_rate(&self, event_name: &str) -> u8 {
        let total = self.store.distinct_user_count();
        if total == 0 {
            return 0;
        }
        let adopters = self.store.users_for_event(event_name).len();
        (adopters as f64 / total as f64 * 100.0).round() as u8
    }

    /// Matching events bucketed by UTC calendar day (`YYYY-MM-DD`).
    pub fn feature_usage_frequency(&self, event_name: &str) -> BTreeMap<String, u64> {
        let mut buckets = BTreeMap::new();
        for event in self.store.events_named(event_name) {
            *buckets
                .entry(event.timestamp.format("%Y-%m-%d").to_string())
                .or_insert(0) += 1;
        }
        buckets
    }
}
