use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `RUPIYA__` and an optional TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub alerting: AlertingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Trailing window, in days, used when computing a cohort's
    /// creation-time retention rate.
    #[serde(default = "default_retention_window_days")]
    pub retention_window_days: i64,
}

/// Initial alert thresholds. Thresholds stay adjustable at runtime via
/// `AlertManager::set_threshold`; these only seed the starting values.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertingConfig {
    #[serde(default = "default_page_load_time_ms")]
    pub page_load_time_ms: f64,
    #[serde(default = "default_dom_content_loaded_ms")]
    pub dom_content_loaded_ms: f64,
    #[serde(default = "default_api_response_time_ms")]
    pub api_response_time_ms: f64,
    #[serde(default = "default_long_task_duration_ms")]
    pub long_task_duration_ms: f64,
    #[serde(default = "default_resource_size_bytes")]
    pub resource_size_bytes: f64,
}

fn default_log_filter() -> String {
    "rupiya=info".to_string()
}

fn default_retention_window_days() -> i64 {
    7
}

fn default_page_load_time_ms() -> f64 {
    3000.0
}

fn default_dom_content_loaded_ms() -> f64 {
    2000.0
}

fn default_api_response_time_ms() -> f64 {
    1000.0
}

fn default_long_task_duration_ms() -> f64 {
    50.0
}

fn default_resource_size_bytes() -> f64 {
    1_048_576.0
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            retention_window_days: default_retention_window_days(),
        }
    }
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            page_load_time_ms: default_page_load_time_ms(),
            dom_content_loaded_ms: default_dom_content_loaded_ms(),
            api_response_time_ms: default_api_response_time_ms(),
            long_task_duration_ms: default_long_task_duration_ms(),
            resource_size_bytes: default_resource_size_bytes(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log: LogConfig::default(),
            analytics: AnalyticsConfig::default(),
            alerting: AlertingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and an optional
    /// `rupiya.toml` in the working directory.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, preferring an explicit config file when one is
    /// given (the file must then exist).
    pub fn load_from(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let builder = match path {
            Some(path) => config::Config::builder().add_source(config::File::with_name(path)),
            None => config::Config::builder()
                .add_source(config::File::with_name("rupiya").required(false)),
        };

        let config = builder
            .add_source(
                config::Environment::with_prefix("RUPIYA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        config.try_deserialize()
    }
}
