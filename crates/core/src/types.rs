use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Name of the event that marks a user's signup. Cohorts are built from
/// events carrying exactly this name.
pub const SIGNUP_EVENT: &str = "user_signup";

/// A single user action recorded against the in-memory event log.
///
/// Events are immutable once appended; the log as a whole can be cleared
/// but individual events are never updated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub user_id: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

impl AnalyticsEvent {
    pub fn new(
        user_id: impl Into<String>,
        event_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        properties: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_name: event_name.into(),
            timestamp,
            properties,
        }
    }
}

/// A fixed set of users grouped by signup date window.
///
/// Membership is snapshotted when the cohort is created and never changes
/// afterwards, even if later events would alter who signed up in the
/// window. `retention_rate` is likewise computed once at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCohort {
    pub cohort_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub users: Vec<String>,
    pub size: u64,
    /// Percentage [0, 100] of members active within the trailing
    /// retention window at creation time.
    pub retention_rate: u8,
}

/// Per-cohort retention counts at the canonical day offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionData {
    /// Cohort start date as `YYYY-MM-DD`.
    pub cohort_date: String,
    pub day0: u64,
    pub day1: u64,
    pub day7: u64,
    pub day30: u64,
    pub day90: u64,
}

/// One step of a funnel analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelStep {
    pub step_name: String,
    /// 1-based position in the funnel.
    pub step_number: u32,
    pub user_count: u64,
    /// Percentage of the previous step's users, rounded to 2 decimals.
    /// Always 100 for the first step.
    pub conversion_rate: f64,
}

/// A named, frozen set of user ids matching a predicate evaluated once
/// at creation time against the users present in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSegment {
    pub segment_id: Uuid,
    pub segment_name: String,
    /// Display-only descriptor; the membership predicate itself is not
    /// stored and is never re-evaluated.
    pub criteria: String,
    pub users: Vec<String>,
    pub size: u64,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// Engagement statistics derived for a segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentEngagement {
    pub average_events_per_user: f64,
    /// Top event names by count among segment members, at most five.
    pub top_events: Vec<(String, u64)>,
    /// Linear score saturating at 100 once average events/user reaches 10.
    pub engagement_score: u8,
}

/// A user's position in the activity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActivity {
    pub user_id: String,
    pub event_count: u64,
}
