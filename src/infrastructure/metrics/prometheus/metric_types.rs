use crate::domain::{MetricType, PromsterOptions, RequestSample};
use anyhow::Result;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

const REQUESTS_TOTAL_HELP: &str = "The number of HTTP requests processed.";
const REQUEST_DURATION_HELP: &str = "The HTTP request latencies in seconds.";
const REQUEST_CONTENT_LENGTH_HELP: &str = "The HTTP request content length in bytes.";
const RESPONSE_CONTENT_LENGTH_HELP: &str = "The HTTP response content length in bytes.";
const UP_HELP: &str = "1 = up, 0 = not up";

/// The metric vectors registered for one plugin instance.
///
/// Each metric may be registered under several names; a sample is written to
/// all of them.
pub(crate) struct MetricTypes {
    label_names: Vec<String>,
    up: Vec<IntGauge>,
    requests_total: Vec<IntCounterVec>,
    request_duration: Vec<HistogramVec>,
    request_content_length: Vec<HistogramVec>,
    response_content_length: Vec<HistogramVec>,
}

impl MetricTypes {
    // ---
    /// Creates every metric selected in `options` and registers it with `registry`.
    ///
    /// # Errors
    /// Returns an error if a metric is invalid or its name is already taken
    /// in the registry.
    pub(crate) fn register(registry: &Registry, options: &PromsterOptions) -> Result<Self> {
        // ---
        let names = options.prefixed_metric_names();
        let label_names = options.label_names();
        let labels: Vec<&str> = label_names.iter().map(String::as_str).collect();

        let mut up = Vec::new();
        for name in &names.up {
            let gauge = IntGauge::new(name.clone(), UP_HELP)?;
            registry.register(Box::new(gauge.clone()))?;
            up.push(gauge);
        }

        let mut requests_total = Vec::new();
        if options.has_metric_type(MetricType::HttpRequestsTotal) {
            for name in &names.http_requests_total {
                let counter = IntCounterVec::new(Opts::new(name.clone(), REQUESTS_TOTAL_HELP), &labels)?;
                registry.register(Box::new(counter.clone()))?;
                requests_total.push(counter);
            }
        }

        let mut request_duration = Vec::new();
        if options.has_metric_type(MetricType::HttpRequestsHistogram) {
            for name in &names.http_request_duration_seconds {
                let opts = HistogramOpts::new(name.clone(), REQUEST_DURATION_HELP)
                    .buckets(options.duration_buckets.clone());
                request_duration.push(register_histogram(registry, opts, &labels)?);
            }
        }

        if options.has_metric_type(MetricType::HttpRequestsSummary) {
            tracing::warn!(
                "Percentile summaries are not supported by the prometheus backend; use the facade backend"
            );
        }

        let mut request_content_length = Vec::new();
        let mut response_content_length = Vec::new();
        if options.has_metric_type(MetricType::HttpContentLengthHistogram) {
            for name in &names.http_request_content_length_bytes {
                let opts = HistogramOpts::new(name.clone(), REQUEST_CONTENT_LENGTH_HELP)
                    .buckets(options.content_length_buckets.clone());
                request_content_length.push(register_histogram(registry, opts, &labels)?);
            }
            for name in &names.http_response_content_length_bytes {
                let opts = HistogramOpts::new(name.clone(), RESPONSE_CONTENT_LENGTH_HELP)
                    .buckets(options.content_length_buckets.clone());
                response_content_length.push(register_histogram(registry, opts, &labels)?);
            }
        }

        Ok(Self {
            label_names,
            up,
            requests_total,
            request_duration,
            request_content_length,
            response_content_length,
        })
    }

    pub(crate) fn observe(&self, sample: &RequestSample) {
        // ---
        let values = sample.labels.values_for(&self.label_names);
        let values = values.as_slice();

        for counter in &self.requests_total {
            counter.with_label_values(values).inc();
        }

        let seconds = sample.duration.as_secs_f64();
        for histogram in &self.request_duration {
            histogram.with_label_values(values).observe(seconds);
        }

        if let Some(length) = sample.request_content_length {
            for histogram in &self.request_content_length {
                histogram.with_label_values(values).observe(length as f64);
            }
        }

        if let Some(length) = sample.response_content_length {
            for histogram in &self.response_content_length {
                histogram.with_label_values(values).observe(length as f64);
            }
        }
    }

    pub(crate) fn set_up(&self, value: i64) {
        for gauge in &self.up {
            gauge.set(value);
        }
    }
}

fn register_histogram(registry: &Registry, opts: HistogramOpts, labels: &[&str]) -> Result<HistogramVec> {
    // ---
    let histogram = HistogramVec::new(opts, labels)?;
    registry.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}
