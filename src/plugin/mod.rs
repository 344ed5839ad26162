//! The metrics plugin.
//!
//! `create_plugin` merges the caller's options over the defaults, builds the
//! metrics backend, starts the process observer and returns a [`Promster`]
//! handle. The handle produces the tower layer that hooks request start and
//! response finish, and exposes the recorder and registry to handlers.
//!
//! The most recently created plugin is also kept process-wide so that code
//! without access to the handle can reach the recorder and flip the "up"
//! gauge.

mod body;
mod layer;

pub use layer::{PromsterLayer, PromsterService};

use crate::domain::{
    is_running_in_kubernetes, MetricsPtr, NormalizeContext, PromsterOptions, RequestInfo,
    RequestLabels, RequestSample,
};
use crate::infrastructure::create_metrics;
use anyhow::Result;
use axum::http::StatusCode;
use std::sync::{Arc, RwLock};
use std::time::Instant;

static CURRENT: RwLock<Option<Promster>> = RwLock::new(None);

/// Forwards finished requests to the metrics backend.
#[derive(Clone)]
pub struct RequestRecorder {
    metrics: MetricsPtr,
}

impl RequestRecorder {
    // ---
    pub fn new(metrics: MetricsPtr) -> Self {
        Self { metrics }
    }

    /// Records a request that started at `start` and finished now.
    pub fn record(&self, start: Instant, labels: RequestLabels) {
        self.record_with_lengths(start, labels, None, None);
    }

    /// Like [`RequestRecorder::record`], with request / response sizes.
    pub fn record_with_lengths(
        &self,
        start: Instant,
        labels: RequestLabels,
        request_content_length: Option<u64>,
        response_content_length: Option<u64>,
    ) {
        // ---
        self.record_sample(&RequestSample {
            labels,
            duration: start.elapsed(),
            request_content_length,
            response_content_length,
        });
    }

    pub fn record_sample(&self, sample: &RequestSample) {
        self.metrics.record_request(sample);
    }

    pub fn metrics(&self) -> &MetricsPtr {
        &self.metrics
    }
}

struct PromsterInner {
    options: PromsterOptions,
    recorder: RequestRecorder,
    skip_by_environment: bool,
}

/// Handle to a created plugin.
///
/// Cheap to clone; every clone shares the same backend.
#[derive(Clone)]
pub struct Promster {
    inner: Arc<PromsterInner>,
}

impl Promster {
    // ---
    /// Tower layer timing every request that passes through it.
    pub fn layer(&self) -> PromsterLayer {
        PromsterLayer::new(self.clone())
    }

    pub fn options(&self) -> &PromsterOptions {
        &self.inner.options
    }

    pub fn recorder(&self) -> RequestRecorder {
        self.inner.recorder.clone()
    }

    /// The metrics backend ("registry") samples are written to.
    pub fn metrics(&self) -> &MetricsPtr {
        self.inner.recorder.metrics()
    }

    /// The Prometheus registry behind the backend, when it has one.
    ///
    /// Handlers reach it through the `Promster` request extension to register
    /// application metrics next to the request metrics.
    pub fn registry(&self) -> Option<Arc<prometheus::Registry>> {
        self.metrics().registry()
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.metrics().render()
    }

    /// `true` when Kubernetes detection is on and the process runs elsewhere.
    pub fn is_skipped_by_environment(&self) -> bool {
        self.inner.skip_by_environment
    }

    pub fn signal_is_up(&self) {
        self.metrics().set_up(true);
    }

    pub fn signal_is_not_up(&self) {
        self.metrics().set_up(false);
    }

    /// Records a request directly, bypassing normalizers and `skip`.
    pub fn record_request(&self, start: Instant, labels: RequestLabels) {
        self.inner.recorder.record(start, labels);
    }

    /// Builds the labels for a finished request.
    ///
    /// `path`, `method` and `status_code` go through their normalizers; custom
    /// label values are merged on top and win on conflicts.
    pub fn labels_for(&self, request: &RequestInfo, status: Option<StatusCode>) -> RequestLabels {
        // ---
        let options = self.options();
        let ctx = NormalizeContext { request, status };
        let status_code = status.map(|s| s.as_u16().to_string()).unwrap_or_default();

        let mut labels = RequestLabels::new(
            (options.normalize_path)(&request.route_path(), &ctx),
            (options.normalize_method)(request.method.as_str(), &ctx),
            (options.normalize_status_code)(&status_code, &ctx),
        );

        if let Some(get_label_values) = &options.get_label_values {
            labels.merge(get_label_values(request, status));
        }
        labels
    }

    /// Whether a finished request with `labels` should be recorded.
    pub fn should_record(
        &self,
        request: &RequestInfo,
        status: Option<StatusCode>,
        labels: &RequestLabels,
    ) -> bool {
        // ---
        if self.inner.skip_by_environment {
            return false;
        }
        match &self.options().skip {
            Some(skip) => !skip(request, status, labels),
            None => true,
        }
    }
}

/// Creates the plugin with the backend named in `options.backend`.
///
/// # Errors
/// Returns an error if the backend cannot register its metrics.
pub fn create_plugin(options: PromsterOptions) -> Result<Promster> {
    // ---
    let metrics = create_metrics(&options)?;
    create_plugin_with_metrics(options, metrics)
}

/// Creates the plugin around an existing backend.
///
/// # Errors
/// Returns an error if the process observer cannot be started.
pub fn create_plugin_with_metrics(options: PromsterOptions, metrics: MetricsPtr) -> Result<Promster> {
    // ---
    let skip_by_environment = options.detect_kubernetes && !is_running_in_kubernetes();

    if skip_by_environment {
        tracing::info!("Not running in Kubernetes; request metrics will not be recorded");
    } else {
        metrics.observe_process()?;
    }

    let promster = Promster {
        inner: Arc::new(PromsterInner {
            options,
            recorder: RequestRecorder::new(metrics),
            skip_by_environment,
        }),
    };

    *CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(promster.clone());
    tracing::info!(
        backend = ?promster.options().backend,
        record_on = ?promster.options().record_on,
        "Request metrics plugin created"
    );

    Ok(promster)
}

/// The most recently created plugin, if any.
pub fn current_plugin() -> Option<Promster> {
    CURRENT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Recorder of the most recently created plugin, if any.
pub fn request_recorder() -> Option<RequestRecorder> {
    current_plugin().map(|promster| promster.recorder())
}

/// Sets the "up" gauge of the current plugin to 1. No-op without a plugin.
pub fn signal_is_up() {
    if let Some(promster) = current_plugin() {
        promster.signal_is_up();
    }
}

/// Sets the "up" gauge of the current plugin to 0. No-op without a plugin.
pub fn signal_is_not_up() {
    if let Some(promster) = current_plugin() {
        promster.signal_is_not_up();
    }
}
