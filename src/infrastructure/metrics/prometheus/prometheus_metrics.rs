//! Prometheus metrics implementation.
//!
//! This module provides a concrete implementation of the `Metrics` trait on
//! top of a `prometheus::Registry` owned by the plugin. Metric vectors are
//! created up front from `PromsterOptions` (see `metric_types.rs`), so the
//! label set of every metric is fixed at registration time.
//!
//! Owning the registry, rather than using the crate's default one, lets
//! several plugin instances live in one process and keeps tests independent.

use super::metric_types::MetricTypes;
use super::process::register_process_collector;
use crate::domain::{Metrics, PromsterOptions, RequestSample};
use anyhow::Result;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Prometheus-based metrics implementation.
pub struct PrometheusMetrics {
    registry: Arc<Registry>,
    metric_types: MetricTypes,
    observing_process: AtomicBool,
}

impl PrometheusMetrics {
    // ---
    /// Creates the metrics in a fresh registry.
    pub fn new(options: &PromsterOptions) -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()), options)
    }

    /// Creates the metrics in an existing registry.
    ///
    /// # Errors
    /// Fails when one of the metric names is already registered.
    pub fn with_registry(registry: Arc<Registry>, options: &PromsterOptions) -> Result<Self> {
        // ---
        tracing::info!("Creating Prometheus metrics");
        let metric_types = MetricTypes::register(&registry, options)?;

        Ok(PrometheusMetrics {
            registry,
            metric_types,
            observing_process: AtomicBool::new(false),
        })
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        // ---
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {err}");
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_else(|err| {
            tracing::error!("Metrics encoding produced invalid UTF-8: {err}");
            String::new()
        })
    }

    fn record_request(&self, sample: &RequestSample) {
        // ---
        tracing::debug!(
            path = sample.labels.path(),
            method = sample.labels.method(),
            status_code = sample.labels.status_code(),
            duration_secs = sample.duration.as_secs_f64(),
            "Recording HTTP request"
        );
        self.metric_types.observe(sample);
    }

    fn set_up(&self, up: bool) {
        self.metric_types.set_up(i64::from(up));
    }

    fn observe_process(&self) -> Result<()> {
        // ---
        if self.observing_process.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        register_process_collector(&self.registry)
    }

    fn registry(&self) -> Option<Arc<Registry>> {
        Some(Arc::clone(&self.registry))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{MetricType, RequestLabels};
    use std::time::Duration;

    fn sample(path: &str, status: &str) -> RequestSample {
        // ---
        RequestSample {
            labels: RequestLabels::new(path, "GET", status),
            duration: Duration::from_millis(120),
            request_content_length: None,
            response_content_length: Some(512),
        }
    }

    #[test]
    fn records_counter_and_histogram() -> Result<()> {
        // ---
        let metrics = PrometheusMetrics::new(&PromsterOptions::default())?;
        metrics.record_request(&sample("/users/{id}", "200"));
        metrics.record_request(&sample("/users/{id}", "200"));

        let text = metrics.render();
        assert!(text.contains(
            r#"http_requests_total{method="GET",path="/users/{id}",status_code="200"} 2"#
        ));
        assert!(text.contains(
            r#"http_request_duration_seconds_bucket{method="GET",path="/users/{id}",status_code="200",le="0.3"} 2"#
        ));
        Ok(())
    }

    #[test]
    fn up_gauge_follows_signal() -> Result<()> {
        // ---
        let metrics = PrometheusMetrics::new(&PromsterOptions::default())?;

        metrics.set_up(true);
        assert!(metrics.render().contains("process_up 1"));

        metrics.set_up(false);
        assert!(metrics.render().contains("process_up 0"));
        Ok(())
    }

    #[test]
    fn content_length_histograms_are_optional() -> Result<()> {
        // ---
        let options = PromsterOptions::default().with_metric_types([
            MetricType::HttpRequestsTotal,
            MetricType::HttpContentLengthHistogram,
        ]);
        let metrics = PrometheusMetrics::new(&options)?;
        metrics.record_request(&sample("/", "200"));

        let text = metrics.render();
        assert!(text.contains("http_response_content_length_bytes_count"));
        assert!(!text.contains("http_request_content_length_bytes_count"));
        assert!(!text.contains("http_request_duration_seconds"));
        Ok(())
    }

    #[test]
    fn duplicate_registration_fails() {
        // ---
        let registry = Arc::new(Registry::new());
        let options = PromsterOptions::default();

        assert!(PrometheusMetrics::with_registry(registry.clone(), &options).is_ok());
        assert!(PrometheusMetrics::with_registry(registry, &options).is_err());
    }

    #[test]
    fn application_collectors_share_the_registry() -> Result<()> {
        // ---
        let metrics = PrometheusMetrics::new(&PromsterOptions::default())?;
        let registry = metrics.registry().expect("prometheus backend owns a registry");

        let jobs = prometheus::IntCounter::new("jobs_processed_total", "Jobs processed.")?;
        registry.register(Box::new(jobs.clone()))?;
        jobs.inc_by(3);

        assert!(metrics.render().contains("jobs_processed_total 3"));
        Ok(())
    }

    #[test]
    fn undeclared_label_values_are_ignored() -> Result<()> {
        // ---
        let metrics = PrometheusMetrics::new(&PromsterOptions::default())?;
        let mut request = sample("/regions/{id}", "200");
        request.labels.merge([("region", "eu-west-1")]);
        metrics.record_request(&request);

        let text = metrics.render();
        assert!(text.contains(
            r#"http_requests_total{method="GET",path="/regions/{id}",status_code="200"} 1"#
        ));
        assert!(!text.contains("region="));
        Ok(())
    }

    #[test]
    fn observe_process_is_idempotent() -> Result<()> {
        // ---
        let metrics = PrometheusMetrics::new(&PromsterOptions::default())?;
        metrics.observe_process()?;
        metrics.observe_process()?;
        Ok(())
    }
}
