//! Configuration schema definitions.
//!
//! All sections default so an empty file (or no file) is a valid config.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the strategy store service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Where strategies come from and how often to refresh them.
    pub strategies: StrategiesConfig,

    /// HTTP query endpoint.
    pub http: HttpConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Strategies source configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct StrategiesConfig {
    /// File path or http(s) URL of the strategies document. `None` serves defaults.
    pub source: Option<String>,

    /// Seconds between reload attempts; 0 disables background reload.
    pub reload_interval_secs: u64,
}

impl StrategiesConfig {
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address (e.g., "0.0.0.0:5778").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5778".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub log_filter: String,

    pub log_format: LogFormat,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Metrics listener address.
    pub metrics_address: String,
}

impl ObservabilityConfig {
    /// Metrics listener address, if metrics are enabled and the address parses.
    pub fn metrics_socket_addr(&self) -> Option<SocketAddr> {
        if !self.metrics_enabled {
            return None;
        }
        self.metrics_address.parse().ok()
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "sampling_strategy_store=info,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
