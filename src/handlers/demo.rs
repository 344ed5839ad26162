use axum::extract::Path;
use std::time::Duration;

/// Echoes the path value back; the route template keeps label cardinality low.
pub async fn echo(Path(value): Path<String>) -> String {
    value
}

/// Sleeps before answering, to give the duration histogram something to show.
pub async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_millis(250)).await;
    "done"
}
