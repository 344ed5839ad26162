// Test helpers are intentionally partially used
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use axum_promster::{
    create_plugin_with_metrics, create_router, PrometheusMetrics, Promster, PromsterOptions,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tower::ServiceExt;

// ============================================================================
// Plugin helpers
// ============================================================================

/// Creates a plugin backed by its own Prometheus registry.
pub fn prometheus_plugin(options: PromsterOptions) -> Promster {
    // ---
    let metrics = PrometheusMetrics::new(&options).expect("metrics should register");
    create_plugin_with_metrics(options, Arc::new(metrics)).expect("plugin should be created")
}

/// Sends a GET request through `app` and reads the whole body.
pub async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    // ---
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    // ---
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================================
// Test Server
// ============================================================================

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
}

impl TestServer {
    // ---
    /// Serves the router built from the current environment.
    pub async fn new() -> Self {
        // ---
        let app = create_router().expect("Should be able to create router");
        Self::serve(app).await
    }

    pub async fn serve(app: Router) -> Self {
        // ---
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = Client::new();

        Self { addr, client }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }
}
