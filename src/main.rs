use anyhow::Result;
use axum_promster::{create_router, signal_is_not_up, signal_is_up, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env when present; real environment variables win.
    dotenvy::dotenv().ok();

    let app = create_router()?;
    let server = ServerConfig::from_env()?;

    info!("Starting at endpoint:{}", server.bind_addr);
    info!("Starting Axum Promster demo server v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;

    signal_is_up();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    signal_is_not_up();

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutdown signal received");
}
