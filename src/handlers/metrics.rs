use crate::app_state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Handler for the `/metrics` endpoint.
///
/// Returns metrics in Prometheus text format for scraping.
/// Renders whichever backend the plugin was created with, so the page is
/// empty when the no-op backend is selected.
pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    // ---

    let metrics_text = app_state.promster().render();

    Ok((
        StatusCode::OK,
        [("content-type", PROMETHEUS_CONTENT_TYPE)],
        metrics_text,
    ))
}
