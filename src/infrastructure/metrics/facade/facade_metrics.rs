//! `metrics` facade implementation.
//!
//! Samples go through the global `metrics` macros (`counter!`, `histogram!`,
//! `gauge!`) and the globally installed `PrometheusHandle` stored in
//! `recorder.rs` renders them. Histograms without configured buckets are
//! rendered as summaries, which is how the percentile metric is exported.

use super::counters::{increment_requests_total, record_histogram, request_labels, set_up};
use crate::domain::{MetricNames, MetricType, Metrics, PromsterOptions, RequestSample};
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};

/// Facade-based metrics implementation.
pub struct FacadeMetrics {
    names: MetricNames,
    label_names: Vec<String>,
    metric_types: Vec<MetricType>,
}

impl FacadeMetrics {
    // ---
    pub fn new(options: &PromsterOptions) -> Self {
        // ---
        tracing::info!("Creating facade metrics");
        let names = options.prefixed_metric_names();

        for name in &names.up {
            describe_gauge!(name.clone(), "1 = up, 0 = not up");
        }
        for name in &names.http_requests_total {
            describe_counter!(name.clone(), "The number of HTTP requests processed.");
        }
        for name in &names.http_request_duration_seconds {
            describe_histogram!(name.clone(), Unit::Seconds, "The HTTP request latencies in seconds.");
        }
        for name in &names.http_request_duration_per_percentile_seconds {
            describe_histogram!(
                name.clone(),
                Unit::Seconds,
                "The HTTP request latencies in seconds by percentile."
            );
        }

        FacadeMetrics {
            names,
            label_names: options.label_names(),
            metric_types: options.metric_types.clone(),
        }
    }

    fn has(&self, metric_type: MetricType) -> bool {
        self.metric_types.contains(&metric_type)
    }
}

impl Metrics for FacadeMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_request(&self, sample: &RequestSample) {
        // ---
        tracing::debug!(
            path = sample.labels.path(),
            method = sample.labels.method(),
            status_code = sample.labels.status_code(),
            "Recording HTTP request"
        );
        let labels = request_labels(sample, &self.label_names);
        let seconds = sample.duration.as_secs_f64();

        if self.has(MetricType::HttpRequestsTotal) {
            increment_requests_total(&self.names.http_requests_total, &labels);
        }
        if self.has(MetricType::HttpRequestsHistogram) {
            record_histogram(&self.names.http_request_duration_seconds, &labels, seconds);
        }
        if self.has(MetricType::HttpRequestsSummary) {
            record_histogram(
                &self.names.http_request_duration_per_percentile_seconds,
                &labels,
                seconds,
            );
        }
        if self.has(MetricType::HttpContentLengthHistogram) {
            if let Some(length) = sample.request_content_length {
                record_histogram(&self.names.http_request_content_length_bytes, &labels, length as f64);
            }
            if let Some(length) = sample.response_content_length {
                record_histogram(&self.names.http_response_content_length_bytes, &labels, length as f64);
            }
        }
    }

    fn set_up(&self, up: bool) {
        set_up(&self.names.up, if up { 1.0 } else { 0.0 });
    }
}
