use crate::domain::{Metrics, RequestSample};

/// No-op metrics implementation for testing.
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        NoopMetrics
    }
}

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_request(&self, _: &RequestSample) {}
    fn set_up(&self, _: bool) {}
}
