//! Funnel analysis — step-wise conversion over an ordered list of event
//! names.

use rupiya_core::types::FunnelStep;
use std::sync::Arc;
use tracing::warn;

pub struct FunnelAnalyzer {
    store: Arc<super::EventStore>,
}

impl FunnelAnalyzer {
    pub fn new(store: Arc<super::EventStore>) -> Self {
        Self { store }
    }

    /// Compute conversion for each step in order.
    ///
    /// Each step counts the distinct users who ever fired that event
    /// anywhere in the log; users are not required to have completed the
    /// prior steps. The first step's rate is always 100; every later
    /// step's rate is its distinct-user count as a percentage of the
    /// previous step's, rounded to 2 decimals, and 0 when the previous
    /// step had no users.
    pub fn analyze(&self, steps: &[&str]) -> Vec<FunnelStep> {
        if steps.is_empty() {
            warn!("Funnel analysis requested with no steps");
            return Vec::new();
        }

        let mut results = Vec::with_capacity(steps.len());
        let mut previous_count: Option<u64> = None;

        for (index, step) in steps.iter().enumerate() {
            let user_count = self.store.users_for_event(step).len() as u64;
            let conversion_rate = match previous_count {
                None => 100.0,
                Some(previous) if previous > 0 => {
                    let rate = user_count as f64 / previous as f64 * 100.0;
                    (rate * 100.0).round() / 100.0
                }
                Some(_) => 0.0,
            };
            results.push(FunnelStep {
                step_name: (*step).to_string(),
                step_number: (index + 1) as u32,
                user_count,
                conversion_rate,
            });
            previous_count = Some(user_count);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventStore;
    use std::collections::HashMap;

    fn make_analyzer() -> (Arc<EventStore>, FunnelAnalyzer) {
        let store = Arc::new(EventStore::new());
        let analyzer = FunnelAnalyzer::new(store.clone());
        (store, analyzer)
    }

    fn fire(store: &EventStore, user: &str, name: &str) {
        store.record_event(user, name, HashMap::new());
    }

    // 1. Conversion rates ---------------------------------------------------

    #[test]
    fn test_step_conversion_rates() {
        let (store, analyzer) = make_analyzer();

        // 10 distinct users at A, 4 at B, 2 at C.
        for i in 0..10 {
            fire(&store, &format!("u{i}"), "signup_viewed");
        }
        for i in 0..4 {
            fire(&store, &format!("u{i}"), "signup_started");
        }
        for i in 0..2 {
            fire(&store, &format!("u{i}"), "signup_completed");
        }

        let steps = analyzer.analyze(&["signup_viewed", "signup_started", "signup_completed"]);
        assert_eq!(steps.len(), 3);

        assert_eq!(steps[0].step_number, 1);
        assert_eq!(steps[0].user_count, 10);
        assert!((steps[0].conversion_rate - 100.0).abs() < f64::EPSILON);

        assert_eq!(steps[1].user_count, 4);
        assert!((steps[1].conversion_rate - 40.0).abs() < f64::EPSILON);

        assert_eq!(steps[2].user_count, 2);
        assert!((steps[2].conversion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duplicate_events_count_distinct_users() {
        let (store, analyzer) = make_analyzer();
        fire(&store, "u1", "signup_viewed");
        fire(&store, "u1", "signup_viewed");
        fire(&store, "u2", "signup_viewed");

        let steps = analyzer.analyze(&["signup_viewed"]);
        assert_eq!(steps[0].user_count, 2);
    }

    // 2. Edge cases ---------------------------------------------------------

    #[test]
    fn test_empty_previous_step_rate_is_zero() {
        let (store, analyzer) = make_analyzer();
        fire(&store, "u1", "signup_completed");

        let steps = analyzer.analyze(&["never_fired", "signup_completed"]);
        assert_eq!(steps[0].user_count, 0);
        assert!((steps[0].conversion_rate - 100.0).abs() < f64::EPSILON);
        assert_eq!(steps[1].user_count, 1);
        assert!(steps[1].conversion_rate.abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_steps_returns_empty() {
        let (_store, analyzer) = make_analyzer();
        assert!(analyzer.analyze(&[]).is_empty());
    }

    #[test]
    fn test_rounding_to_two_decimals() {
        let (store, analyzer) = make_analyzer();
        for i in 0..3 {
            fire(&store, &format!("u{i}"), "first");
        }
        fire(&store, "u0", "second");

        let steps = analyzer.analyze(&["first", "second"]);
        // 1/3 of users -> 33.33 after rounding.
        assert!((steps[1].conversion_rate - 33.33).abs() < f64::EPSILON);
    }
}
