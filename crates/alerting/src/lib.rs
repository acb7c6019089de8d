//! Performance alerting — threshold checks with a resolvable alert
//! lifecycle, budget-vs-actual reporting, and metric sample export.

pub mod alerts;
pub mod budget;
pub mod monitor;

pub use alerts::{AlertManager, AlertSeverity, AlertStatistics, AlertThresholds, MetricKind, PerformanceAlert};
pub use budget::{BudgetState, BudgetStatus, PerformanceBudget};
pub use monitor::PerformanceMonitor;
