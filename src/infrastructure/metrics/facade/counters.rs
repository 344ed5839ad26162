use crate::domain::RequestSample;
use metrics::{counter, gauge, histogram, Label};

/// Builds the label list for `sample` restricted to `label_names`.
pub fn request_labels(sample: &RequestSample, label_names: &[String]) -> Vec<Label> {
    // ---
    label_names
        .iter()
        .zip(sample.labels.values_for(label_names))
        .map(|(name, value)| Label::new(name.clone(), value.to_string()))
        .collect()
}

/// Increment the request counter for every configured name.
pub fn increment_requests_total(names: &[String], labels: &[Label]) {
    for name in names {
        counter!(name.clone(), labels.to_vec()).increment(1);
    }
}

/// Track an observation (latency or size) using a histogram per name.
pub fn record_histogram(names: &[String], labels: &[Label], value: f64) {
    for name in names {
        histogram!(name.clone(), labels.to_vec()).record(value);
    }
}

/// Set every "up" gauge.
pub fn set_up(names: &[String], value: f64) {
    for name in names {
        gauge!(name.clone()).set(value);
    }
}
