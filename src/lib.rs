// src/lib.rs
use anyhow::Result;
use axum::{routing::get, Router};

use app_state::AppState;
use handlers::{echo, health_check, metrics_handler, root_handler, slow};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod plugin;

pub use config::*;

pub use domain::{
    MetricType, MetricsBackend, PromsterOptions, RecordOn, RequestInfo, RequestLabels,
    RequestStart,
};

pub use handlers::PROMETHEUS_CONTENT_TYPE;

// Hoist up the plugin surface
pub use plugin::{
    create_plugin, create_plugin_with_metrics, current_plugin, request_recorder, signal_is_not_up,
    signal_is_up, Promster, PromsterLayer, PromsterService, RequestRecorder,
};

// Publicly expose the backend creation functions and types
pub use infrastructure::metrics::facade::FacadeMetrics;
pub use infrastructure::metrics::noop::NoopMetrics;
pub use infrastructure::metrics::prometheus::PrometheusMetrics;
pub use infrastructure::{
    create_facade_metrics, // ---
    create_metrics,
    create_noop_metrics,
    create_prom_metrics,
};

/// Build the demo HTTP router with the metrics plugin configured from environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let promster = create_plugin(config.metrics.to_options())?;
    Ok(router_with_plugin(promster))
}

/// Build the demo HTTP router around an existing plugin.
///
/// Every route, `/metrics` included, sits behind the plugin's layer.
pub fn router_with_plugin(promster: Promster) -> Router {
    // ---
    let layer = promster.layer();
    let app_state = AppState::new(promster);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/echo/{value}", get(echo))
        .route("/slow", get(slow))
        .layer(layer)
        .with_state(app_state)
}
