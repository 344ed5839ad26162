pub mod facade;
pub mod noop;
pub mod prometheus;

use crate::domain::{MetricsBackend, MetricsPtr, PromsterOptions};

// Re-export the factory functions for easy access
pub use self::facade::create as create_facade_metrics;
pub use self::noop::create as create_noop_metrics;
pub use self::prometheus::create as create_prom_metrics;

/// Creates the backend selected by `options.backend`.
pub fn create_metrics(options: &PromsterOptions) -> anyhow::Result<MetricsPtr> {
    // ---
    match options.backend {
        MetricsBackend::Prometheus => create_prom_metrics(options),
        MetricsBackend::Facade => create_facade_metrics(options),
        MetricsBackend::Noop => create_noop_metrics(),
    }
}
