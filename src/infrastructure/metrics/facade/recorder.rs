use crate::domain::PromsterOptions;
use anyhow::{bail, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static INSTALLED: OnceLock<InstalledRecorder> = OnceLock::new();

/// The global recorder and the histogram names it has buckets for.
struct InstalledRecorder {
    handle: PrometheusHandle,
    duration_names: Vec<String>,
    content_length_names: Vec<String>,
}

impl InstalledRecorder {
    // ---
    /// Names in `options` that would be exported as summaries instead of
    /// histograms by this recorder.
    fn uncovered_histograms(&self, options: &PromsterOptions) -> Vec<String> {
        // ---
        let names = options.prefixed_metric_names();
        let content_names = names
            .http_request_content_length_bytes
            .iter()
            .chain(&names.http_response_content_length_bytes);

        let uncovered_durations = names
            .http_request_duration_seconds
            .iter()
            .filter(|name| !has_suffix(name, &self.duration_names));
        let uncovered_content = content_names.filter(|name| !has_suffix(name, &self.content_length_names));

        uncovered_durations.chain(uncovered_content).cloned().collect()
    }
}

fn has_suffix(name: &str, suffixes: &[String]) -> bool {
    suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Install the Prometheus recorder globally and store the handle.
///
/// The `metrics` facade accepts a single global recorder per process. The
/// first call installs it with the buckets and quantiles from `options`.
/// Buckets are matched by the unprefixed metric names, so later plugins with
/// another prefix still export histograms; their buckets and quantiles are
/// the ones installed first.
///
/// # Errors
/// Fails when the installed recorder has no buckets for one of the histogram
/// names in `options`, which would otherwise be exported as a summary.
pub fn init_metrics(options: &PromsterOptions) -> Result<PrometheusHandle> {
    // ---
    if let Some(installed) = INSTALLED.get() {
        return reuse(installed, options);
    }

    let names = &options.metric_names;
    let duration_names = names.http_request_duration_seconds.clone();
    let content_length_names: Vec<String> = names
        .http_request_content_length_bytes
        .iter()
        .chain(&names.http_response_content_length_bytes)
        .cloned()
        .collect();

    let mut builder = PrometheusBuilder::new().set_quantiles(&options.percentiles)?;
    for name in &duration_names {
        builder = builder.set_buckets_for_metric(Matcher::Suffix(name.clone()), &options.duration_buckets)?;
    }
    for name in &content_length_names {
        builder = builder
            .set_buckets_for_metric(Matcher::Suffix(name.clone()), &options.content_length_buckets)?;
    }

    let handle = builder.install_recorder()?;

    // A concurrent caller may have won the race; keep whichever recorder landed.
    let installed = INSTALLED.get_or_init(|| InstalledRecorder {
        handle,
        duration_names,
        content_length_names,
    });
    reuse(installed, options)
}

fn reuse(installed: &InstalledRecorder, options: &PromsterOptions) -> Result<PrometheusHandle> {
    // ---
    let uncovered = installed.uncovered_histograms(options);
    if !uncovered.is_empty() {
        bail!(
            "Prometheus recorder is already installed without buckets for {}",
            uncovered.join(", ")
        );
    }
    Ok(installed.handle.clone())
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    // ---
    INSTALLED
        .get()
        .map(|installed| installed.handle.render())
        .unwrap_or_default()
}
