//! Metric and API-call sample recording with JSON/CSV export.
//!
//! Recording and export only; wiring samples into the alert checks is
//! left to calling code.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rupiya_core::RupiyaResult;
use serde::{Deserialize, Serialize};

/// Header row of the metric CSV export. Export consumers parse this
/// exact text.
const METRICS_CSV_HEADER: &str = "Metric Name,Value,Unit,Timestamp";

/// Header row of the API-call CSV export.
const API_CALLS_CSV_HEADER: &str = "Endpoint,Method,Duration (ms),Status,Timestamp";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallRecord {
    pub endpoint: String,
    pub method: String,
    pub duration_ms: f64,
    pub status: u16,
    pub timestamp: DateTime<Utc>,
}

/// Accumulates externally-pushed performance samples.
pub struct PerformanceMonitor {
    metrics: RwLock<Vec<MetricSample>>,
    api_calls: RwLock<Vec<ApiCallRecord>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            metrics: RwLock::new(Vec::new()),
            api_calls: RwLock::new(Vec::new()),
        }
    }

    pub fn record_metric(&self, name: &str, value: f64, unit: &str) -> MetricSample {
        let sample = MetricSample {
            name: name.to_string(),
            value,
            unit: unit.to_string(),
            timestamp: Utc::now(),
        };
        self.metrics.write().push(sample.clone());
        sample
    }

    pub fn record_api_call(
        &self,
        endpoint: &str,
        method: &str,
        duration_ms: f64,
        status: u16,
    ) -> ApiCallRecord {
        let record = ApiCallRecord {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            duration_ms,
            status,
            timestamp: Utc::now(),
        };
        self.api_calls.write().push(record.clone());
        record
    }

    pub fn metrics(&self) -> Vec<MetricSample> {
        self.metrics.read().clone()
    }

    pub fn api_calls(&self) -> Vec<ApiCallRecord> {
        self.api_calls.read().clone()
    }

    /// Pretty-printed dump of all recorded samples.
    pub fn export_metrics_as_json(&self) -> RupiyaResult<String> {
        let value = serde_json::json!({
            "generated_at": Utc::now(),
            "metrics": self.metrics(),
            "api_calls": self.api_calls(),
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }

    pub fn export_metrics_as_csv(&self) -> String {
        let mut out = String::from(METRICS_CSV_HEADER);
        out.push('\n');
        for sample in self.metrics.read().iter() {
            out.push_str(&format!(
                "{},{},{},{}\n",
                sample.name,
                sample.value,
                sample.unit,
                sample.timestamp.to_rfc3339()
            ));
        }
        out
    }

    pub fn export_api_calls_as_csv(&self) -> String {
        let mut out = String::from(API_CALLS_CSV_HEADER);
        out.push('\n');
        for record in self.api_calls.read().iter() {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                record.endpoint,
                record.method,
                record.duration_ms,
                record.status,
                record.timestamp.to_rfc3339()
            ));
        }
        out
    }

    /// Drop all recorded samples.
    pub fn clear(&self) {
        self.metrics.write().clear();
        self.api_calls.write().clear();
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1. Recording ----------------------------------------------------------

    #[test]
    fn test_record_and_clear() {
        let monitor = PerformanceMonitor::new();
        monitor.record_metric("page_load_time", 1200.0, "ms");
        monitor.record_api_call("/api/expenses", "GET", 340.0, 200);

        assert_eq!(monitor.metrics().len(), 1);
        assert_eq!(monitor.api_calls().len(), 1);

        monitor.clear();
        assert!(monitor.metrics().is_empty());
        assert!(monitor.api_calls().is_empty());
    }

    // 2. Export formats -----------------------------------------------------

    #[test]
    fn test_metrics_csv_header_and_rows() {
        let monitor = PerformanceMonitor::new();
        monitor.record_metric("page_load_time", 1200.0, "ms");

        let csv = monitor.export_metrics_as_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Metric Name,Value,Unit,Timestamp"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("page_load_time,1200,ms,"));
    }

    #[test]
    fn test_api_calls_csv_header_and_rows() {
        let monitor = PerformanceMonitor::new();
        monitor.record_api_call("/api/expenses", "GET", 340.0, 200);

        let csv = monitor.export_api_calls_as_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Endpoint,Method,Duration (ms),Status,Timestamp")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("/api/expenses,GET,340,200,"));
    }

    #[test]
    fn test_export_metrics_as_json() {
        let monitor = PerformanceMonitor::new();
        monitor.record_metric("page_load_time", 1200.0, "ms");
        monitor.record_api_call("/api/expenses", "GET", 340.0, 200);

        let json = monitor.export_metrics_as_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metrics"].as_array().unwrap().len(), 1);
        assert_eq!(value["api_calls"][0]["endpoint"], "/api/expenses");
    }
}
