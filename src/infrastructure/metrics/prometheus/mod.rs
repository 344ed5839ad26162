mod metric_types;
mod process;
mod prometheus_metrics;

pub use prometheus_metrics::PrometheusMetrics;

use crate::domain::PromsterOptions;
use std::sync::Arc;

/// Creates a new Prometheus metrics implementation.
///
/// This implementation collects metrics in a registry owned by the returned
/// instance and renders them in Prometheus text format for scraping.
pub fn create(options: &PromsterOptions) -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    Ok(Arc::new(PrometheusMetrics::new(options)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_returns_valid_metrics() {
        let result = create(&PromsterOptions::default());
        assert!(result.is_ok());
    }
}
