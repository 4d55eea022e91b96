use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{Json, Router, routing::get};
use config::HealthConfig;
use http::StatusCode;
use tokio::{net::TcpListener, task::JoinHandle};

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum HealthState {
    /// The server is up and serving requests.
    Healthy,
}

/// Handles health check requests and returns the current health status of the server.
pub(crate) async fn health() -> (StatusCode, Json<HealthState>) {
    (StatusCode::OK, Json(HealthState::Healthy))
}

/// Serves the health check endpoint on its own address in the background. Failures are logged.
pub(super) fn spawn_health_endpoint(addr: SocketAddr, health_config: HealthConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = bind_health_endpoint(addr, health_config).await {
            log::error!("{e}");
        }
    })
}

/// Serves the health check endpoint on its own address.
pub(super) async fn bind_health_endpoint(addr: SocketAddr, health_config: HealthConfig) -> anyhow::Result<()> {
    let path = &health_config.path;
    let app = Router::new().route(path, get(health));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow!("Failed to bind the health endpoint to {addr}: {e}"))?;

    log::info!("Health check endpoint exposed at http://{addr}{path}");

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server in the health endpoint: {e}"))?;

    Ok(())
}
