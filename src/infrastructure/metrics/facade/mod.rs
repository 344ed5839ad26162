mod counters;
mod facade_metrics;
mod recorder;

pub use facade_metrics::FacadeMetrics;
use std::sync::Arc;

use crate::domain::PromsterOptions;
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a metrics implementation backed by the global `metrics` facade.
///
/// Installs the Prometheus recorder on first use. Useful when the rest of
/// the application already records through the `metrics` macros and a
/// single `/metrics` page should show everything.
pub fn create(options: &PromsterOptions) -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing facade metrics");
    init_metrics(options)?;

    Ok(Arc::new(FacadeMetrics::new(options)))
}
