// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use crate::domain::{MetricsBackend, PromsterOptions, RecordOn};
use anyhow::Result;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable that must parse when present.
///
/// A missing variable yields the default; a present but invalid value is a
/// deployment error and aborts startup.
macro_rules! strict_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        match std::env::var($key) {
            Ok(value) => value.parse::<$ty>().map_err(|err| {
                anyhow::anyhow!(concat!("Invalid configuration for ", $key, ": {}"), err)
            })?,
            Err(_) => $default,
        }
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails because of an invalid
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration for ", $key)),
            "unexpected error: {err}"
        );
    }};
}

/// Splits a comma-separated list, dropping empty entries.
fn split_list(value: &str) -> Vec<String> {
    // ---
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub metrics: request_metrics::MetricsConfig,
    pub server: server::ServerConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            metrics: request_metrics::MetricsConfig::from_env()?,
            server: server::ServerConfig::from_env()?,
        })
    }
}

// ============================================================
// Metrics configuration
// ============================================================

mod request_metrics {
    // ---
    use super::*;

    /// Request-metrics plugin configuration.
    #[derive(Debug, Clone)]
    pub struct MetricsConfig {
        /// Backend receiving the samples. Defaults to `prom`.
        pub backend: MetricsBackend,

        /// Prefix prepended to every metric name. Defaults to empty.
        pub metric_prefix: String,

        /// Record only when running inside Kubernetes. Defaults to false.
        pub detect_kubernetes: bool,

        /// When the response-finish hook fires. Defaults to `body`.
        pub record_on: RecordOn,

        /// Request duration buckets in seconds, when overridden.
        pub duration_buckets: Option<Vec<f64>>,

        /// Extra label names declared on every request metric.
        pub labels: Vec<String>,
    }

    impl MetricsConfig {
        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the backend, record point or buckets are invalid.
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = strict_env_parse!("PROMSTER_METRICS_TYPE", MetricsBackend, MetricsBackend::default());
            let metric_prefix = std::env::var("PROMSTER_METRIC_PREFIX").unwrap_or_default();
            let detect_kubernetes = optional_env_parse!("PROMSTER_DETECT_KUBERNETES", bool, false);
            let record_on = strict_env_parse!("PROMSTER_RECORD_ON", RecordOn, RecordOn::default());

            let duration_buckets = match std::env::var("PROMSTER_DURATION_BUCKETS") {
                Ok(value) => Some(parse_buckets(&value)?),
                Err(_) => None,
            };

            let labels = std::env::var("PROMSTER_LABELS")
                .map(|value| split_list(&value))
                .unwrap_or_default();

            Ok(Self {
                backend,
                metric_prefix,
                detect_kubernetes,
                record_on,
                duration_buckets,
                labels,
            })
        }

        /// Plugin options with this configuration applied over the defaults.
        pub fn to_options(&self) -> PromsterOptions {
            // ---
            let options = PromsterOptions::default()
                .with_backend(self.backend)
                .with_metric_prefix(self.metric_prefix.clone())
                .with_detect_kubernetes(self.detect_kubernetes)
                .with_record_on(self.record_on)
                .with_labels(self.labels.clone());

            match &self.duration_buckets {
                Some(buckets) => options.with_duration_buckets(buckets.clone()),
                None => options,
            }
        }
    }

    /// Parses ascending, comma-separated bucket bounds.
    fn parse_buckets(value: &str) -> Result<Vec<f64>> {
        // ---
        let buckets = split_list(value)
            .iter()
            .map(|item| item.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| {
                anyhow::anyhow!("Invalid configuration for PROMSTER_DURATION_BUCKETS: {err}")
            })?;

        if buckets.is_empty() || buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
            anyhow::bail!(
                "Invalid configuration for PROMSTER_DURATION_BUCKETS: buckets must be non-empty and ascending"
            );
        }
        Ok(buckets)
    }
}
pub use request_metrics::MetricsConfig;

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Demo server configuration.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Address the demo server binds to. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr = std::env::var("PROMSTER_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

            Ok(Self { bind_addr })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Tests
// ============================================================
