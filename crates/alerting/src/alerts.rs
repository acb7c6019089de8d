//! Threshold-driven performance alerting with deterministic alert
//! identities and a manual resolution lifecycle.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use rupiya_core::config::AlertingConfig;
use rupiya_core::RupiyaResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::budget::{self, BudgetStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// A notice that a monitored metric sample exceeded its threshold.
///
/// Alert identity is deterministic per check kind (and per target for the
/// keyed checks), so re-triggering the same check overwrites the prior
/// alert rather than accumulating duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceAlert {
    pub id: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub metric: String,
    pub current_value: f64,
    pub threshold: f64,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
}

/// Runtime-adjustable alert thresholds, distinct from the fixed
/// performance budgets used for percentage reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub page_load_time_ms: f64,
    pub dom_content_loaded_ms: f64,
    pub api_response_time_ms: f64,
    pub long_task_duration_ms: f64,
    pub resource_size_bytes: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            page_load_time_ms: 3000.0,
            dom_content_loaded_ms: 2000.0,
            api_response_time_ms: 1000.0,
            long_task_duration_ms: 50.0,
            resource_size_bytes: 1_048_576.0,
        }
    }
}

impl From<&AlertingConfig> for AlertThresholds {
    fn from(config: &AlertingConfig) -> Self {
        Self {
            page_load_time_ms: config.page_load_time_ms,
            dom_content_loaded_ms: config.dom_content_loaded_ms,
            api_response_time_ms: config.api_response_time_ms,
            long_task_duration_ms: config.long_task_duration_ms,
            resource_size_bytes: config.resource_size_bytes,
        }
    }
}

/// Threshold keys adjustable via `AlertManager::set_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    PageLoadTime,
    DomContentLoaded,
    ApiResponseTime,
    LongTaskDuration,
    ResourceSize,
}

/// Counts over the whole alert map, resolved entries included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertStatistics {
    pub total: u64,
    pub active: u64,
    pub resolved: u64,
    pub critical: u64,
    pub warning: u64,
    pub info: u64,
}

/// Alert lifecycle per id: absent -> active -> resolved, with a new
/// breach of the same id reactivating (overwriting) a resolved alert.
pub struct AlertManager {
    alerts: DashMap<String, PerformanceAlert>,
    thresholds: RwLock<AlertThresholds>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self::with_thresholds(AlertThresholds::default())
    }

    pub fn with_thresholds(thresholds: AlertThresholds) -> Self {
        Self {
            alerts: DashMap::new(),
            thresholds: RwLock::new(thresholds),
        }
    }

    pub fn from_config(config: &AlertingConfig) -> Self {
        Self::with_thresholds(AlertThresholds::from(config))
    }

    // -- checks -------------------------------------------------------------

    /// Fire a critical alert when a page load sample exceeds the
    /// threshold. Returns `None` (leaving prior state untouched) when the
    /// sample is within budget.
    pub fn check_page_load_time(&self, duration_ms: f64) -> Option<PerformanceAlert> {
        let threshold = self.thresholds.read().page_load_time_ms;
        if duration_ms <= threshold {
            return None;
        }
        Some(self.fire(
            "slow_page_load".to_string(),
            AlertSeverity::Critical,
            "Slow Page Load".to_string(),
            format!("Page load took {duration_ms:.0}ms (threshold {threshold:.0}ms)"),
            "page_load_time".to_string(),
            duration_ms,
            threshold,
            "Code-split routes and defer non-critical scripts to shrink the initial load"
                .to_string(),
        ))
    }

    pub fn check_dom_content_loaded(&self, duration_ms: f64) -> Option<PerformanceAlert> {
        let threshold = self.thresholds.read().dom_content_loaded_ms;
        if duration_ms <= threshold {
            return None;
        }
        Some(self.fire(
            "slow_dom_ready".to_string(),
            AlertSeverity::Warning,
            "Slow DOM Ready".to_string(),
            format!("DOM content loaded in {duration_ms:.0}ms (threshold {threshold:.0}ms)"),
            "dom_content_loaded".to_string(),
            duration_ms,
            threshold,
            "Inline critical CSS and move render-blocking scripts behind defer".to_string(),
        ))
    }

    /// Alert id is keyed by endpoint, so each slow endpoint tracks its own
    /// lifecycle.
    pub fn check_api_response_time(&self, endpoint: &str, duration_ms: f64) -> Option<PerformanceAlert> {
        let threshold = self.thresholds.read().api_response_time_ms;
        if duration_ms <= threshold {
            return None;
        }
        Some(self.fire(
            format!("slow_api_{endpoint}"),
            AlertSeverity::Warning,
            "Slow API Response".to_string(),
            format!("{endpoint} responded in {duration_ms:.0}ms (threshold {threshold:.0}ms)"),
            "api_response_time".to_string(),
            duration_ms,
            threshold,
            "Cache repeated reads and paginate large API responses".to_string(),
        ))
    }

    pub fn check_long_task(&self, task_name: &str, duration_ms: f64) -> Option<PerformanceAlert> {
        let threshold = self.thresholds.read().long_task_duration_ms;
        if duration_ms <= threshold {
            return None;
        }
        Some(self.fire(
            format!("long_task_{task_name}"),
            AlertSeverity::Warning,
            "Long Task Detected".to_string(),
            format!("Task {task_name} blocked the main thread for {duration_ms:.0}ms"),
            "long_task_duration".to_string(),
            duration_ms,
            threshold,
            "Chunk long-running work and yield back to the main thread".to_string(),
        ))
    }

    pub fn check_resource_size(&self, resource_name: &str, size_bytes: f64) -> Option<PerformanceAlert> {
        let threshold = self.thresholds.read().resource_size_bytes;
        if size_bytes <= threshold {
            return None;
        }
        Some(self.fire(
            format!("large_resource_{resource_name}"),
            AlertSeverity::Info,
            "Large Resource".to_string(),
            format!("{resource_name} weighs {size_bytes:.0} bytes (threshold {threshold:.0})"),
            "resource_size".to_string(),
            size_bytes,
            threshold,
            "Compress large assets and serve images in modern formats".to_string(),
        ))
    }

    // -- lifecycle ----------------------------------------------------------

    /// Mark an alert resolved. Returns `false` for an unknown id. A later
    /// breach of the same id reactivates the alert.
    pub fn resolve_alert(&self, id: &str) -> bool {
        match self.alerts.get_mut(id) {
            Some(mut entry) => {
                entry.resolved = true;
                debug!(alert_id = id, "Alert resolved");
                true
            }
            None => false,
        }
    }

    pub fn set_threshold(&self, kind: MetricKind, value: f64) {
        let mut thresholds = self.thresholds.write();
        match kind {
            MetricKind::PageLoadTime => thresholds.page_load_time_ms = value,
            MetricKind::DomContentLoaded => thresholds.dom_content_loaded_ms = value,
            MetricKind::ApiResponseTime => thresholds.api_response_time_ms = value,
            MetricKind::LongTaskDuration => thresholds.long_task_duration_ms = value,
            MetricKind::ResourceSize => thresholds.resource_size_bytes = value,
        }
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds.read().clone()
    }

    /// Drop all alert records. Thresholds are untouched.
    pub fn clear_alerts(&self) {
        self.alerts.clear();
    }

    // -- queries ------------------------------------------------------------

    /// Unresolved alerts, oldest first.
    pub fn active_alerts(&self) -> Vec<PerformanceAlert> {
        let mut alerts: Vec<PerformanceAlert> = self
            .alerts
            .iter()
            .filter(|entry| !entry.value().resolved)
            .map(|entry| entry.value().clone())
            .collect();
        alerts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        alerts
    }

    pub fn alerts_by_severity(&self, severity: AlertSeverity) -> Vec<PerformanceAlert> {
        self.active_alerts()
            .into_iter()
            .filter(|alert| alert.severity == severity)
            .collect()
    }

    /// Counts over every alert record kept by the manager, including
    /// resolved ones (the map doubles as the alert history).
    pub fn alert_statistics(&self) -> AlertStatistics {
        let mut stats = AlertStatistics::default();
        for entry in self.alerts.iter() {
            let alert = entry.value();
            stats.total += 1;
            if alert.resolved {
                stats.resolved += 1;
            } else {
                stats.active += 1;
            }
            match alert.severity {
                AlertSeverity::Critical => stats.critical += 1,
                AlertSeverity::Warning => stats.warning += 1,
                AlertSeverity::Info => stats.info += 1,
            }
        }
        stats
    }

    /// Deduplicated recommendation strings from active alerts, oldest
    /// alert first.
    pub fn optimization_recommendations(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut recommendations = Vec::new();
        for alert in self.active_alerts() {
            if seen.insert(alert.recommendation.clone()) {
                recommendations.push(alert.recommendation);
            }
        }
        recommendations
    }

    /// Budget-vs-actual report over the fixed performance budgets.
    pub fn budget_status(&self, metrics: &HashMap<String, f64>) -> Vec<BudgetStatus> {
        budget::evaluate_budgets(metrics)
    }

    /// Pretty-printed dump of all alerts, statistics, and the current
    /// thresholds.
    pub fn export_alerts_as_json(&self) -> RupiyaResult<String> {
        let mut alerts: Vec<PerformanceAlert> =
            self.alerts.iter().map(|entry| entry.value().clone()).collect();
        alerts.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let value = serde_json::json!({
            "generated_at": Utc::now(),
            "alerts": alerts,
            "statistics": self.alert_statistics(),
            "thresholds": self.thresholds(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    // -- internal -----------------------------------------------------------

    #[allow(clippy::too_many_arguments)]
    fn fire(
        &self,
        id: String,
        severity: AlertSeverity,
        title: String,
        message: String,
        metric: String,
        current_value: f64,
        threshold: f64,
        recommendation: String,
    ) -> PerformanceAlert {
        let alert = PerformanceAlert {
            id,
            severity,
            title,
            message,
            metric,
            current_value,
            threshold,
            recommendation,
            timestamp: Utc::now(),
            resolved: false,
        };
        info!(
            alert_id = %alert.id,
            severity = ?alert.severity,
            current_value = alert.current_value,
            "Performance alert fired"
        );
        metrics::counter!("alerting.alerts_fired").increment(1);
        // Upsert keyed by id: a repeat breach overwrites the prior record,
        // refreshing the timestamp and clearing any resolution.
        self.alerts.insert(alert.id.clone(), alert.clone());
        alert
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new()
    }
}
