// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, ConnectionGuard};
pub use types::{
    Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, ProfilingConfig,
    ReportsConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `EDA__SERVER__PORT=9000`
const ENV_PREFIX: &str = "EDA";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Sources, lowest priority first: built-in defaults, the config file
    /// (optional), `EDA__*` environment variables, then `port_override`.
    pub fn load_from(
        config_path: &str,
        port_override: Option<u16>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("http.server_name", "eda-report-server")?
            .set_default("http.enable_cors", true)?
            .set_default("http.max_body_size", 52_428_800)? // 50MB
            .set_default("reports.dir", "reports")?
            .set_default("reports.url_prefix", "/reports")?
            .set_default("reports.title", "EDA Report")?
            .set_default("reports.cache_max_age", 0)?;

        let profiling = ProfilingConfig::default();
        builder = builder
            .set_default("profiling.histogram_bins", as_i64(profiling.histogram_bins))?
            .set_default("profiling.top_values", as_i64(profiling.top_values))?
            .set_default("profiling.sample_rows", as_i64(profiling.sample_rows))?
            .set_default(
                "profiling.categorical_max_distinct",
                as_i64(profiling.categorical_max_distinct),
            )?
            .set_default("profiling.high_cardinality", as_i64(profiling.high_cardinality))?
            .set_default("profiling.missing_threshold", profiling.missing_threshold)?
            .set_default("profiling.zeros_threshold", profiling.zeros_threshold)?
            .set_default("profiling.skewness_threshold", profiling.skewness_threshold)?
            .set_default(
                "profiling.correlation_threshold",
                profiling.correlation_threshold,
            )?;

        if let Some(port) = port_override {
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

fn as_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
