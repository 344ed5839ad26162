use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Axum Promster demo
Version: {version}

Available endpoints:
  - GET    /metrics            - Prometheus metrics
  - GET    /health             - Health check
  - GET    /echo/{{value}}       - Echoes a path value (recorded as /echo/{{value}})
  - GET    /slow               - Responds after 250ms

Every request is timed and exported as http_requests_total and
http_request_duration_seconds, labelled by path, method and status_code.
"#
    )
}
