use super::labels::RequestSample;
use prometheus::Registry;
use std::sync::Arc;

/// Abstraction over the metrics library that aggregates request samples.
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record one finished request.
    fn record_request(&self, sample: &RequestSample);

    /// Set every "up" gauge to 1 (`true`) or 0 (`false`).
    fn set_up(&self, up: bool);

    /// Start exporting process-level metrics (CPU, memory, file descriptors).
    ///
    /// Backends without a process collector accept the call and do nothing.
    fn observe_process(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// The registry rendered by [`Metrics::render`], for backends that own one.
    ///
    /// Applications register their own collectors here to have them exported
    /// on the same `/metrics` page.
    fn registry(&self) -> Option<Arc<Registry>> {
        None
    }
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
