//! Cohort analysis — signup-window cohorts and retention at fixed day
//! offsets.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rupiya_core::types::{RetentionData, UserCohort, SIGNUP_EVENT};
use rupiya_core::{RupiyaError, RupiyaResult};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Day offsets that populate a `RetentionData` record.
pub const CANONICAL_RETENTION_DAYS: [i64; 5] = [0, 1, 7, 30, 90];

pub struct CohortAnalyzer {
    store: Arc<super::EventStore>,
    cohorts: DashMap<Uuid, UserCohort>,
    retention_window_days: i64,
}

impl CohortAnalyzer {
    pub fn new(store: Arc<super::EventStore>) -> Self {
        Self::with_retention_window(store, 7)
    }

    /// `retention_window_days` is the trailing window used for the
    /// creation-time retention rate.
    pub fn with_retention_window(store: Arc<super::EventStore>, retention_window_days: i64) -> Self {
        Self {
            store,
            cohorts: DashMap::new(),
            retention_window_days,
        }
    }

    /// Snapshot a cohort from the distinct users whose `user_signup`
    /// event falls inside `[start, end]` (inclusive both ends).
    ///
    /// Membership and `retention_rate` are frozen here; signup events
    /// appended later never change an existing cohort.
    pub fn create_cohort(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> UserCohort {
        let mut seen = HashSet::new();
        let mut users = Vec::new();
        for event in self.store.events_named(SIGNUP_EVENT) {
            if event.timestamp >= start && event.timestamp <= end && seen.insert(event.user_id.clone())
            {
                users.push(event.user_id);
            }
        }

        let retention_rate = self.calculate_retention_rate(&users);
        let cohort = UserCohort {
            cohort_id: Uuid::new_v4(),
            start_date: start,
            size: users.len() as u64,
            users,
            retention_rate,
        };
        info!(
            cohort_id = %cohort.cohort_id,
            size = cohort.size,
            retention_rate = cohort.retention_rate,
            "Cohort created"
        );
        self.cohorts.insert(cohort.cohort_id, cohort.clone());
        cohort
    }

    /// Percentage of the given users with at least one event of any kind
    /// inside the trailing retention window, measured from the current
    /// wall-clock time and rounded to the nearest integer. Returns 0 for
    /// an empty user list.
    pub fn calculate_retention_rate(&self, users: &[String]) -> u8 {
        if users.is_empty() {
            return 0;
        }
        let cutoff = Utc::now() - Duration::days(self.retention_window_days);
        let active = users
            .iter()
            .filter(|user| {
                self.store
                    .events_for_user(user)
                    .iter()
                    .any(|event| event.timestamp >= cutoff)
            })
            .count();
        (active as f64 / users.len() as f64 * 100.0).round() as u8
    }

    /// Retention counts at the canonical offsets 0, 1, 7, 30, and 90 days.
    pub fn cohort_retention(&self, cohort_id: &Uuid) -> RupiyaResult<RetentionData> {
        self.cohort_retention_at(cohort_id, &CANONICAL_RETENTION_DAYS)
    }

    /// Retention counts at arbitrary day offsets. Each requested offset is
    /// the number of cohort members with at least one event at or after
    /// `start_date + offset` days. Only the canonical offsets (0, 1, 7,
    /// 30, 90) populate the result record; other requested offsets are
    /// computed and discarded.
    pub fn cohort_retention_at(&self, cohort_id: &Uuid, days: &[i64]) -> RupiyaResult<RetentionData> {
        let cohort = self
            .cohorts
            .get(cohort_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RupiyaError::CohortNotFound(cohort_id.to_string()))?;

        let mut data = RetentionData {
            cohort_date: cohort.start_date.format("%Y-%m-%d").to_string(),
            day0: 0,
            day1: 0,
            day7: 0,
            day30: 0,
            day90: 0,
        };

        for &offset in days {
            let threshold = cohort.start_date + Duration::days(offset);
            let count = cohort
                .users
                .iter()
                .filter(|user| {
                    self.store
                        .events_for_user(user)
                        .iter()
                        .any(|event| event.timestamp >= threshold)
                })
                .count() as u64;
            match offset {
                0 => data.day0 = count,
                1 => data.day1 = count,
                7 => data.day7 = count,
                30 => data.day30 = count,
                90 => data.day90 = count,
                _ => debug!(offset, count, "Non-canonical retention offset discarded"),
            }
        }

        Ok(data)
    }

    pub fn get_cohort(&self, cohort_id: &Uuid) -> Option<UserCohort> {
        self.cohorts.get(cohort_id).map(|entry| entry.value().clone())
    }

    pub fn list_cohorts(&self) -> Vec<UserCohort> {
        self.cohorts.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Drop all cohort snapshots. The underlying event log is untouched.
    pub fn clear(&self) {
        self.cohorts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStore;
    use std::collections::HashMap;

    fn make_analyzer() -> (Arc<EventStore>, CohortAnalyzer) {
        let store = Arc::new(EventStore::new());
        let analyzer = CohortAnalyzer::new(store.clone());
        (store, analyzer)
    }

    fn signup_at(store: &EventStore, user: &str, days_ago: i64) {
        store.record_event_at(
            user,
            SIGNUP_EVENT,
            Utc::now() - Duration::days(days_ago),
            HashMap::new(),
        );
    }

    // 1. Cohort creation ----------------------------------------------------

    #[test]
    fn test_create_cohort_window_inclusive() {
        let (store, analyzer) = make_analyzer();
        signup_at(&store, "u1", 20);
        signup_at(&store, "u2", 10);
        signup_at(&store, "u3", 2);

        let start = Utc::now() - Duration::days(15);
        let end = Utc::now() - Duration::days(5);
        let cohort = analyzer.create_cohort(start, end);

        assert_eq!(cohort.size, 1);
        assert_eq!(cohort.users, vec!["u2"]);
    }

    #[test]
    fn test_cohort_membership_immutable() {
        let (store, analyzer) = make_analyzer();
        signup_at(&store, "u1", 10);

        let start = Utc::now() - Duration::days(15);
        let end = Utc::now();
        let cohort = analyzer.create_cohort(start, end);
        assert_eq!(cohort.size, 1);

        // A later signup inside the same window must not change the snapshot.
        signup_at(&store, "u2", 10);
        let stored = analyzer.get_cohort(&cohort.cohort_id).unwrap();
        assert_eq!(stored.size, 1);
        assert_eq!(stored.users, vec!["u1"]);
    }

    // 2. Retention rate -----------------------------------------------------

    #[test]
    fn test_retention_rate_empty_cohort_is_zero() {
        let (_store, analyzer) = make_analyzer();
        assert_eq!(analyzer.calculate_retention_rate(&[]), 0);
    }

    #[test]
    fn test_retention_rate_counts_recent_activity() {
        let (store, analyzer) = make_analyzer();
        signup_at(&store, "u1", 20);
        signup_at(&store, "u2", 20);
        // u1 active yesterday, u2 silent since signup.
        store.record_event_at(
            "u1",
            "expense_added",
            Utc::now() - Duration::days(1),
            HashMap::new(),
        );

        let users = vec!["u1".to_string(), "u2".to_string()];
        assert_eq!(analyzer.calculate_retention_rate(&users), 50);
    }

    // 3. Retention offsets --------------------------------------------------

    #[test]
    fn test_cohort_retention_counts_by_offset() {
        let (store, analyzer) = make_analyzer();
        signup_at(&store, "u1", 30);
        signup_at(&store, "u2", 30);
        // u1 returns a day later, u2 never does.
        store.record_event_at(
            "u1",
            "dashboard_viewed",
            Utc::now() - Duration::days(29),
            HashMap::new(),
        );

        let start = Utc::now() - Duration::days(31);
        let cohort = analyzer.create_cohort(start, Utc::now() - Duration::days(25));
        let retention = analyzer.cohort_retention(&cohort.cohort_id).unwrap();

        // Signup events themselves count for day 0.
        assert_eq!(retention.day0, 2);
        assert_eq!(retention.day1, 1);
        assert_eq!(retention.day7, 0);
        assert_eq!(retention.day30, 0);
        assert_eq!(retention.day90, 0);
        assert_eq!(retention.cohort_date, start.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_non_canonical_offsets_discarded() {
        let (store, analyzer) = make_analyzer();
        signup_at(&store, "u1", 10);

        let cohort = analyzer.create_cohort(Utc::now() - Duration::days(15), Utc::now());
        let retention = analyzer
            .cohort_retention_at(&cohort.cohort_id, &[0, 3, 14])
            .unwrap();

        // Offsets 3 and 14 are computed but have no bucket in the record.
        assert_eq!(retention.day0, 1);
        assert_eq!(retention.day1, 0);
        assert_eq!(retention.day7, 0);
    }

    #[test]
    fn test_unknown_cohort_is_error() {
        let (_store, analyzer) = make_analyzer();
        let result = analyzer.cohort_retention(&Uuid::new_v4());
        assert!(matches!(result, Err(RupiyaError::CohortNotFound(_))));
    }
}
