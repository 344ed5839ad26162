//! Plugin options and their defaults.
//!
//! `PromsterOptions::default()` is the merge of the metric-type defaults,
//! the recorder defaults and the default normalizers. Callers override
//! individual fields through the `with_*` builders.

use super::labels::{RequestLabels, DEFAULT_LABELS};
use super::normalizers;
use super::request::{NormalizeContext, RequestInfo};
use anyhow::{anyhow, Result};
use axum::http::StatusCode;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Maps a raw label value to its recorded form.
pub type Normalizer = Arc<dyn Fn(&str, &NormalizeContext<'_>) -> String + Send + Sync>;

/// Produces extra label values for a finished request.
pub type LabelValuesFn =
    Arc<dyn Fn(&RequestInfo, Option<StatusCode>) -> Vec<(String, String)> + Send + Sync>;

/// Returns `true` when a finished request must not be recorded.
pub type SkipFn =
    Arc<dyn Fn(&RequestInfo, Option<StatusCode>, &RequestLabels) -> bool + Send + Sync>;

/// Seconds buckets for the request duration histogram.
pub const DEFAULT_DURATION_BUCKETS: [f64; 10] = [0.05, 0.1, 0.3, 0.5, 0.8, 1.0, 1.5, 2.0, 3.0, 10.0];

/// Byte buckets for the request / response size histograms.
pub const DEFAULT_CONTENT_LENGTH_BUCKETS: [f64; 9] = [
    100_000.0,
    200_000.0,
    500_000.0,
    1_000_000.0,
    1_500_000.0,
    2_000_000.0,
    3_000_000.0,
    5_000_000.0,
    10_000_000.0,
];

/// Quantiles for the request duration summary.
pub const DEFAULT_PERCENTILES: [f64; 5] = [0.5, 0.9, 0.95, 0.98, 0.99];

/// Which request metrics a backend should maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    /// Counter of finished requests.
    HttpRequestsTotal,
    /// Histogram of request durations.
    HttpRequestsHistogram,
    /// Summary of request durations by percentile.
    HttpRequestsSummary,
    /// Histograms of request and response body sizes.
    HttpContentLengthHistogram,
}

/// When the response-finish hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOn {
    /// After the response body was fully sent (or dropped).
    #[default]
    BodyEnd,
    /// As soon as the response head is produced.
    Headers,
}

impl FromStr for RecordOn {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        // ---
        match value.trim().to_lowercase().as_str() {
            "body" | "body_end" | "response" => Ok(RecordOn::BodyEnd),
            "headers" | "pre_response" => Ok(RecordOn::Headers),
            other => Err(anyhow!("Invalid record point: {other}")),
        }
    }
}

/// Metrics backend selected when the plugin is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricsBackend {
    /// Dedicated `prometheus::Registry` owned by the plugin.
    #[default]
    Prometheus,
    /// Global `metrics` facade rendered by `metrics-exporter-prometheus`.
    Facade,
    /// Records nothing.
    Noop,
}

impl FromStr for MetricsBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        // ---
        match value.trim().to_lowercase().as_str() {
            "prom" | "prometheus" => Ok(MetricsBackend::Prometheus),
            "facade" | "metrics" => Ok(MetricsBackend::Facade),
            "noop" | "none" => Ok(MetricsBackend::Noop),
            other => Err(anyhow!("Invalid metrics type: {other}")),
        }
    }
}

/// Metric names; every sample is written under each listed name.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricNames {
    pub up: Vec<String>,
    pub http_requests_total: Vec<String>,
    pub http_request_duration_seconds: Vec<String>,
    pub http_request_duration_per_percentile_seconds: Vec<String>,
    pub http_request_content_length_bytes: Vec<String>,
    pub http_response_content_length_bytes: Vec<String>,
}

impl Default for MetricNames {
    fn default() -> Self {
        // ---
        let name = |n: &str| vec![n.to_string()];
        Self {
            up: name("process_up"),
            http_requests_total: name("http_requests_total"),
            http_request_duration_seconds: name("http_request_duration_seconds"),
            http_request_duration_per_percentile_seconds: name(
                "http_request_duration_per_percentile_seconds",
            ),
            http_request_content_length_bytes: name("http_request_content_length_bytes"),
            http_response_content_length_bytes: name("http_response_content_length_bytes"),
        }
    }
}

impl MetricNames {
    /// Returns a copy with `prefix` prepended to every name.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        // ---
        let apply = |names: &[String]| -> Vec<String> {
            names.iter().map(|n| format!("{prefix}{n}")).collect()
        };
        Self {
            up: apply(&self.up),
            http_requests_total: apply(&self.http_requests_total),
            http_request_duration_seconds: apply(&self.http_request_duration_seconds),
            http_request_duration_per_percentile_seconds: apply(
                &self.http_request_duration_per_percentile_seconds,
            ),
            http_request_content_length_bytes: apply(&self.http_request_content_length_bytes),
            http_response_content_length_bytes: apply(&self.http_response_content_length_bytes),
        }
    }
}

/// Options accepted by [`crate::create_plugin`].
#[derive(Clone)]
pub struct PromsterOptions {
    pub backend: MetricsBackend,
    pub metric_prefix: String,
    pub metric_types: Vec<MetricType>,
    pub metric_names: MetricNames,
    pub duration_buckets: Vec<f64>,
    pub content_length_buckets: Vec<f64>,
    pub percentiles: Vec<f64>,
    /// Extra label names; custom label values must be declared here.
    pub labels: Vec<String>,
    /// Record only when running inside Kubernetes.
    pub detect_kubernetes: bool,
    pub record_on: RecordOn,
    pub normalize_path: Normalizer,
    pub normalize_method: Normalizer,
    pub normalize_status_code: Normalizer,
    pub get_label_values: Option<LabelValuesFn>,
    pub skip: Option<SkipFn>,
}

impl Default for PromsterOptions {
    fn default() -> Self {
        // ---
        Self {
            backend: MetricsBackend::default(),
            metric_prefix: String::new(),
            metric_types: vec![MetricType::HttpRequestsTotal, MetricType::HttpRequestsHistogram],
            metric_names: MetricNames::default(),
            duration_buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
            content_length_buckets: DEFAULT_CONTENT_LENGTH_BUCKETS.to_vec(),
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            labels: Vec::new(),
            detect_kubernetes: false,
            record_on: RecordOn::default(),
            normalize_path: Arc::new(normalizers::normalize_path),
            normalize_method: Arc::new(normalizers::normalize_method),
            normalize_status_code: Arc::new(normalizers::normalize_status_code),
            get_label_values: None,
            skip: None,
        }
    }
}

impl fmt::Debug for PromsterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromsterOptions")
            .field("backend", &self.backend)
            .field("metric_prefix", &self.metric_prefix)
            .field("metric_types", &self.metric_types)
            .field("metric_names", &self.metric_names)
            .field("duration_buckets", &self.duration_buckets)
            .field("content_length_buckets", &self.content_length_buckets)
            .field("percentiles", &self.percentiles)
            .field("labels", &self.labels)
            .field("detect_kubernetes", &self.detect_kubernetes)
            .field("record_on", &self.record_on)
            .field("get_label_values", &self.get_label_values.is_some())
            .field("skip", &self.skip.is_some())
            .finish_non_exhaustive()
    }
}

impl PromsterOptions {
    // ---
    pub fn with_backend(mut self, backend: MetricsBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_metric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    pub fn with_metric_types(mut self, metric_types: impl Into<Vec<MetricType>>) -> Self {
        self.metric_types = metric_types.into();
        self
    }

    pub fn with_metric_names(mut self, metric_names: MetricNames) -> Self {
        self.metric_names = metric_names;
        self
    }

    pub fn with_duration_buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.duration_buckets = buckets.into();
        self
    }

    pub fn with_content_length_buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.content_length_buckets = buckets.into();
        self
    }

    pub fn with_percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.percentiles = percentiles.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_detect_kubernetes(mut self, detect: bool) -> Self {
        self.detect_kubernetes = detect;
        self
    }

    pub fn with_record_on(mut self, record_on: RecordOn) -> Self {
        self.record_on = record_on;
        self
    }

    pub fn with_normalize_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &NormalizeContext<'_>) -> String + Send + Sync + 'static,
    {
        self.normalize_path = Arc::new(f);
        self
    }

    pub fn with_normalize_method<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &NormalizeContext<'_>) -> String + Send + Sync + 'static,
    {
        self.normalize_method = Arc::new(f);
        self
    }

    pub fn with_normalize_status_code<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &NormalizeContext<'_>) -> String + Send + Sync + 'static,
    {
        self.normalize_status_code = Arc::new(f);
        self
    }

    pub fn with_label_values<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestInfo, Option<StatusCode>) -> Vec<(String, String)> + Send + Sync + 'static,
    {
        self.get_label_values = Some(Arc::new(f));
        self
    }

    pub fn with_skip<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestInfo, Option<StatusCode>, &RequestLabels) -> bool + Send + Sync + 'static,
    {
        self.skip = Some(Arc::new(f));
        self
    }

    /// Label names every vector metric is declared with.
    pub fn label_names(&self) -> Vec<String> {
        // ---
        let mut names: Vec<String> = DEFAULT_LABELS.iter().map(|n| n.to_string()).collect();
        for label in &self.labels {
            if !names.contains(label) {
                names.push(label.clone());
            }
        }
        names
    }

    /// Metric names with the configured prefix applied.
    pub fn prefixed_metric_names(&self) -> MetricNames {
        self.metric_names.with_prefix(&self.metric_prefix)
    }

    pub fn has_metric_type(&self, metric_type: MetricType) -> bool {
        self.metric_types.contains(&metric_type)
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn defaults_match_recorder_defaults() {
        // ---
        let options = PromsterOptions::default();

        assert_eq!(options.backend, MetricsBackend::Prometheus);
        assert_eq!(
            options.metric_types,
            vec![MetricType::HttpRequestsTotal, MetricType::HttpRequestsHistogram]
        );
        assert_eq!(options.duration_buckets, DEFAULT_DURATION_BUCKETS.to_vec());
        assert!(!options.detect_kubernetes);
        assert_eq!(options.record_on, RecordOn::BodyEnd);
        assert!(options.skip.is_none());
    }

    #[test]
    fn label_names_append_custom_labels_once() {
        // ---
        let options = PromsterOptions::default().with_labels(["tenant", "path"]);

        assert_eq!(options.label_names(), vec!["path", "method", "status_code", "tenant"]);
    }

    #[test]
    fn prefix_applies_to_every_name() {
        // ---
        let options = PromsterOptions::default().with_metric_prefix("api_");
        let names = options.prefixed_metric_names();

        assert_eq!(names.http_requests_total, vec!["api_http_requests_total"]);
        assert_eq!(names.up, vec!["api_process_up"]);
    }

    #[test]
    fn backend_and_record_on_parse() -> Result<()> {
        // ---
        assert_eq!("prom".parse::<MetricsBackend>()?, MetricsBackend::Prometheus);
        assert_eq!("Facade".parse::<MetricsBackend>()?, MetricsBackend::Facade);
        assert_eq!("noop".parse::<MetricsBackend>()?, MetricsBackend::Noop);
        assert!("statsd".parse::<MetricsBackend>().is_err());

        assert_eq!("headers".parse::<RecordOn>()?, RecordOn::Headers);
        assert_eq!("body".parse::<RecordOn>()?, RecordOn::BodyEnd);
        Ok(())
    }
}
