//! User segments — frozen membership snapshots plus derived engagement
//! statistics.

use dashmap::DashMap;
use rupiya_core::types::{SegmentEngagement, UserSegment};
use rupiya_core::{RupiyaError, RupiyaResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Display-only descriptor stored in place of the membership predicate.
const CRITERIA_DESCRIPTOR: &str = "custom predicate";

pub struct SegmentEngine {
    store: Arc<super::EventStore>,
    segments: DashMap<Uuid, UserSegment>,
}

impl SegmentEngine {
    pub fn new(store: Arc<super::EventStore>) -> Self {
        Self {
            store,
            segments: DashMap::new(),
        }
    }

    /// Evaluate `predicate` against every distinct user id present in the
    /// event log and snapshot the matches as a segment.
    ///
    /// A user that never recorded an event cannot become a member, even
    /// if the predicate would accept it. The predicate itself is not
    /// stored; `criteria` carries only a display descriptor, and
    /// membership is never re-evaluated as new events arrive.
    pub fn create_segment<F>(
        &self,
        name: &str,
        predicate: F,
        properties: HashMap<String, serde_json::Value>,
    ) -> UserSegment
    where
        F: Fn(&str) -> bool,
    {
        let users: Vec<String> = self
            .store
            .distinct_users()
            .into_iter()
            .filter(|user| predicate(user))
            .collect();

        let segment = UserSegment {
            segment_id: Uuid::new_v4(),
            segment_name: name.to_string(),
            criteria: CRITERIA_DESCRIPTOR.to_string(),
            size: users.len() as u64,
            users,
            properties,
        };
        info!(
            segment_id = %segment.segment_id,
            name = %segment.segment_name,
            size = segment.size,
            "Segment created"
        );
        self.segments.insert(segment.segment_id, segment.clone());
        segment
    }

    /// Engagement statistics for a segment: average events per member
    /// (2 decimals, 0 for an empty segment), the top five event names by
    /// count among member events (ties broken by name), and a linear
    /// engagement score saturating at 100 once the average reaches 10.
    pub fn segment_engagement(&self, segment_id: &Uuid) -> RupiyaResult<SegmentEngagement> {
        let segment = self
            .segments
            .get(segment_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RupiyaError::SegmentNotFound(segment_id.to_string()))?;

        let mut total_events = 0u64;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for user in &segment.users {
            for event in self.store.events_for_user(user) {
                total_events += 1;
                *counts.entry(event.event_name).or_insert(0) += 1;
            }
        }

        let average_events_per_user = if segment.size > 0 {
            let average = total_events as f64 / segment.size as f64;
            (average * 100.0).round() / 100.0
        } else {
            0.0
        };

        let mut top_events: Vec<(String, u64)> = counts.into_iter().collect();
        top_events.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_events.truncate(5);

        let engagement_score =
            ((average_events_per_user / 10.0 * 100.0).round() as u64).min(100) as u8;

        Ok(SegmentEngagement {
            average_events_per_user,
            top_events,
            engagement_score,
        })
    }

    pub fn get_segment(&self, segment_id: &Uuid) -> Option<UserSegment> {
        self.segments.get(segment_id).map(|entry| entry.value().clone())
    }

    pub fn list_segments(&self) -> Vec<UserSegment> {
        self.segments.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Drop all segment snapshots. The underlying event log is untouched.
    pub fn clear(&self) {
        self.segments.clear();
    }
}
