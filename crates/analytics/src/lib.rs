//! In-memory product analytics — event log, cohort retention, funnel
//! conversion, user segments, and activity rollups.

pub mod activity;
pub mod cohort;
pub mod events;
pub mod funnel;
pub mod segment;

pub use activity::ActivityAggregator;
pub use cohort::CohortAnalyzer;
pub use events::EventStore;
pub use funnel::FunnelAnalyzer;
pub use segment::SegmentEngine;
