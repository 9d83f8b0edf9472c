// Configuration sections
// One struct per TOML table; defaults live in `Config::load_from`

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub reports: ReportsConfig,
    pub profiling: ProfilingConfig,
}

/// `[server]`
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Runtime worker threads; CPU count when unset
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// `[logging]`
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Log the header count of every request at debug level
    pub show_headers: bool,
    /// combined, common, json, or a `$variable` pattern
    pub access_log_format: String,
    /// Append access lines here instead of stdout
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Append error lines here instead of stderr
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// `[performance]`
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Reuse connections for further requests
    pub keep_alive: bool,
    /// Seconds a client gets to send a complete request head, `0` for no
    /// limit. Request bodies and report generation are not bounded.
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// `[http]`
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Value of the `Server` response header
    pub server_name: String,
    pub enable_cors: bool,
    /// Upload limit in bytes
    pub max_body_size: u64,
}

/// `[health]` check endpoints
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub liveness_path: String,
    /// Answers `503` while the report directory is missing
    pub readiness_path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            liveness_path: "/healthz".to_string(),
            readiness_path: "/readyz".to_string(),
        }
    }
}

/// Generated report storage
#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory reports are written to and served from
    pub dir: String,
    /// URL prefix for serving reports, also used to build `report_url`
    pub url_prefix: String,
    /// Title shown at the top of every report
    pub title: String,
    /// `Cache-Control` max-age for served reports; 0 means `no-cache`
    pub cache_max_age: u32,
}

/// Statistics and alert thresholds
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProfilingConfig {
    pub histogram_bins: usize,
    /// Most frequent values listed per categorical/text variable
    pub top_values: usize,
    /// Rows in the head/tail sample and the duplicate rows table
    pub sample_rows: usize,
    /// Text variables with at most this many distinct values are categorical
    pub categorical_max_distinct: usize,
    pub high_cardinality: usize,
    pub missing_threshold: f64,
    pub zeros_threshold: f64,
    pub skewness_threshold: f64,
    pub correlation_threshold: f64,
}

impl Default for ProfilingConfig {
    fn default() -> Self {
        Self {
            histogram_bins: 50,
            top_values: 10,
            sample_rows: 10,
            categorical_max_distinct: 50,
            high_cardinality: 50,
            missing_threshold: 0.0,
            zeros_threshold: 0.1,
            skewness_threshold: 20.0,
            correlation_threshold: 0.9,
        }
    }
}
