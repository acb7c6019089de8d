//! Rupiya — in-memory analytics and performance alerting engine for the
//! Rupiya personal-finance app.
//!
//! Wires configuration, tracing, and the engines together; `--demo`
//! seeds a sample event feed and prints the dashboard reports.

use chrono::{Duration, Utc};
use clap::Parser;
use rand::Rng;
use rupiya_alerting::{AlertManager, PerformanceMonitor};
use rupiya_analytics::{
    ActivityAggregator, CohortAnalyzer, EventStore, FunnelAnalyzer, SegmentEngine,
};
use rupiya_core::config::AppConfig;
use rupiya_core::types::SIGNUP_EVENT;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

const DEMO_FEATURE_EVENTS: [&str; 7] = [
    "expense_added",
    "income_added",
    "budget_created",
    "goal_created",
    "document_uploaded",
    "note_created",
    "dashboard_viewed",
];

#[derive(Parser, Debug)]
#[command(name = "rupiya")]
#[command(about = "In-memory analytics and performance alerting engine")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./rupiya.toml if present)
    #[arg(long)]
    config: Option<String>,

    /// Tracing filter (overrides config)
    #[arg(long, env = "RUPIYA__LOG__FILTER")]
    log_filter: Option<String>,

    /// Retention window in days (overrides config)
    #[arg(long, env = "RUPIYA__ANALYTICS__RETENTION_WINDOW_DAYS")]
    retention_window: Option<i64>,

    /// Seed a demo event feed and print the dashboard reports
    #[arg(long, default_value_t = false)]
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut load_error = None;
    let mut config = AppConfig::load_from(cli.config.as_deref()).unwrap_or_else(|e| {
        load_error = Some(e);
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(filter) = cli.log_filter {
        config.log.filter = filter;
    }
    if let Some(days) = cli.retention_window {
        config.analytics.retention_window_days = days;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .init();

    info!("Rupiya analytics engine starting up");
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(
        filter = %config.log.filter,
        retention_window_days = config.analytics.retention_window_days,
        "Configuration loaded"
    );

    let store = Arc::new(EventStore::new());
    let cohorts =
        CohortAnalyzer::with_retention_window(store.clone(), config.analytics.retention_window_days);
    let funnels = FunnelAnalyzer::new(store.clone());
    let segments = SegmentEngine::new(store.clone());
    let activity = ActivityAggregator::new(store.clone());
    let alerts = AlertManager::from_config(&config.alerting);
    let monitor = PerformanceMonitor::new();

    if cli.demo {
        seed_demo_events(&store);
        run_demo_dashboard(&store, &cohorts, &funnels, &segments, &activity, &alerts, &monitor)?;
    } else {
        info!("No workload selected; run with --demo to seed a sample event feed");
    }

    Ok(())
}

/// Seed a month of synthetic activity: each user signs up at a random
/// point in the window, then fires a random mix of feature events.
fn seed_demo_events(store: &EventStore) {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    for u in 0..50 {
        let user_id = format!("user-{u:03}");
        let signup = now - Duration::days(rng.gen_range(0..30)) - Duration::hours(rng.gen_range(0..24));
        store.record_event_at(&user_id, SIGNUP_EVENT, signup, HashMap::new());

        let event_count = rng.gen_range(0..40);
        for _ in 0..event_count {
            let name = DEMO_FEATURE_EVENTS[rng.gen_range(0..DEMO_FEATURE_EVENTS.len())];
            let elapsed = (now - signup).num_minutes().max(1);
            let timestamp = signup + Duration::minutes(rng.gen_range(0..elapsed));
            store.record_event_at(&user_id, name, timestamp, HashMap::new());
        }
    }

    info!(events = store.len(), "Demo event feed seeded");
}

fn run_demo_dashboard(
    store: &Arc<EventStore>,
    cohorts: &CohortAnalyzer,
    funnels: &FunnelAnalyzer,
    segments: &SegmentEngine,
    activity: &ActivityAggregator,
    alerts: &AlertManager,
    monitor: &PerformanceMonitor,
) -> anyhow::Result<()> {
    let now = Utc::now();

    // Cohort of everyone who signed up in the window, with retention.
    let cohort = cohorts.create_cohort(now - Duration::days(30), now);
    let retention = cohorts.cohort_retention(&cohort.cohort_id)?;

    // Onboarding funnel.
    let funnel = funnels.analyze(&[SIGNUP_EVENT, "expense_added", "budget_created", "goal_created"]);

    // Power users: ten or more recorded events.
    let power_users = segments.create_segment(
        "power users",
        |user_id| store.events_for_user(user_id).len() >= 10,
        HashMap::new(),
    );
    let engagement = segments.segment_engagement(&power_users.segment_id)?;

    // Simulated instrumentation samples feeding the alert checks.
    alerts.check_page_load_time(3450.0);
    alerts.check_dom_content_loaded(1450.0);
    alerts.check_api_response_time("/api/expenses", 1320.0);
    alerts.check_long_task("chart_render", 72.0);
    alerts.check_resource_size("vendor.js", 1_600_000.0);

    monitor.record_metric("page_load_time", 3450.0, "ms");
    monitor.record_metric("dom_content_loaded", 1450.0, "ms");
    monitor.record_api_call("/api/expenses", "GET", 1320.0, 200);

    let mut metrics = HashMap::new();
    metrics.insert("page_load_time".to_string(), 3450.0);
    metrics.insert("dom_content_loaded".to_string(), 1450.0);
    metrics.insert("api_response_time".to_string(), 1320.0);

    let dashboard = serde_json::json!({
        "cohort": cohort,
        "retention": retention,
        "funnel": funnel,
        "power_users": {
            "segment": power_users,
            "engagement": engagement,
        },
        "event_distribution": activity.event_distribution(),
        "top_users": activity.top_users(),
        "feature_adoption": {
            "expense_added": activity.feature_adoption_rate("expense_added"),
            "budget_created": activity.feature_adoption_rate("budget_created"),
        },
        "budget_status": alerts.budget_status(&metrics),
    });

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    println!("{}", alerts.export_alerts_as_json()?);
    println!("{}", monitor.export_metrics_as_json()?);
    print!("{}", monitor.export_metrics_as_csv());
    print!("{}", monitor.export_api_calls_as_csv());

    Ok(())
}
