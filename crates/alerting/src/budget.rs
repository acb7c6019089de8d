//! Performance budgets — fixed target ceilings used for
//! percentage-of-budget reporting, separate from the runtime-adjustable
//! alert thresholds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A fixed target ceiling for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceBudget {
    pub metric: String,
    pub budget: f64,
    pub unit: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetState {
    Ok,
    Warning,
    Exceeded,
}

/// Budget-vs-actual for one metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub budget: PerformanceBudget,
    pub status: BudgetState,
    pub percentage: f64,
}

/// The fixed budget catalogue.
pub fn performance_budgets() -> Vec<PerformanceBudget> {
    vec![
        PerformanceBudget {
            metric: "page_load_time".to_string(),
            budget: 3000.0,
            unit: "ms".to_string(),
            description: "Total page load time".to_string(),
        },
        PerformanceBudget {
            metric: "dom_content_loaded".to_string(),
            budget: 2000.0,
            unit: "ms".to_string(),
            description: "DOM content loaded time".to_string(),
        },
        PerformanceBudget {
            metric: "api_response_time".to_string(),
            budget: 1000.0,
            unit: "ms".to_string(),
            description: "API response time".to_string(),
        },
        PerformanceBudget {
            metric: "bundle_size".to_string(),
            budget: 512_000.0,
            unit: "bytes".to_string(),
            description: "JavaScript bundle size".to_string(),
        },
    ]
}

/// Strict boundaries: above 100 percent is exceeded, above 80 percent is
/// a warning. Exactly 80 or 100 stays in the lower bucket.
pub fn classify_usage(percentage: f64) -> BudgetState {
    if percentage > 100.0 {
        BudgetState::Exceeded
    } else if percentage > 80.0 {
        BudgetState::Warning
    } else {
        BudgetState::Ok
    }
}

/// Evaluate every budget against the supplied metric samples. A metric
/// absent from `metrics` reports 0 percent usage.
pub fn evaluate_budgets(metrics: &HashMap<String, f64>) -> Vec<BudgetStatus> {
    performance_budgets()
        .into_iter()
        .map(|budget| {
            let percentage = metrics
                .get(&budget.metric)
                .map(|value| value / budget.budget * 100.0)
                .unwrap_or(0.0);
            BudgetStatus {
                status: classify_usage(percentage),
                percentage,
                budget,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1. Classifier boundaries ----------------------------------------------

    #[test]
    fn test_classifier_strict_boundaries() {
        assert_eq!(classify_usage(79.99), BudgetState::Ok);
        assert_eq!(classify_usage(80.0), BudgetState::Ok);
        assert_eq!(classify_usage(80.01), BudgetState::Warning);
        assert_eq!(classify_usage(100.0), BudgetState::Warning);
        assert_eq!(classify_usage(100.01), BudgetState::Exceeded);
    }

    // 2. Budget evaluation --------------------------------------------------

    #[test]
    fn test_evaluate_budgets_statuses() {
        let mut metrics = HashMap::new();
        metrics.insert("page_load_time".to_string(), 1500.0);
        metrics.insert("dom_content_loaded".to_string(), 1900.0);
        metrics.insert("api_response_time".to_string(), 1200.0);

        let statuses = evaluate_budgets(&metrics);
        assert_eq!(statuses.len(), 4);

        let by_metric = |name: &str| {
            statuses
                .iter()
                .find(|s| s.budget.metric == name)
                .unwrap()
        };

        assert_eq!(by_metric("page_load_time").status, BudgetState::Ok);
        assert_eq!(by_metric("dom_content_loaded").status, BudgetState::Warning);
        assert_eq!(by_metric("api_response_time").status, BudgetState::Exceeded);
        // Absent metric reports zero usage.
        let bundle = by_metric("bundle_size");
        assert_eq!(bundle.status, BudgetState::Ok);
        assert!(bundle.percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_eighty_percent_of_page_load_budget() {
        // 2400 / 3000 lands a hair above 80 in IEEE-754, so the strict
        // greater-than comparison classifies it as a warning.
        let mut metrics = HashMap::new();
        metrics.insert("page_load_time".to_string(), 2400.0);

        let statuses = evaluate_budgets(&metrics);
        let page_load = statuses
            .iter()
            .find(|s| s.budget.metric == "page_load_time")
            .unwrap();
        assert_eq!(page_load.status, BudgetState::Warning);
        assert!(page_load.percentage > 80.0);
    }
}
