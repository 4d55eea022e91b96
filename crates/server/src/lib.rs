//! Mailgate server library.
//!
//! Provides a reusable server function to serve mailgate either for the binary, or for the integration tests.

#![deny(missing_docs)]

mod auth;
mod health;
mod pages;
mod send;
mod session;
mod state;

#[cfg(test)]
mod test_support;

use std::net::SocketAddr;

use anyhow::anyhow;
use auth::RequireLoginLayer;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use config::{Config, SendLogStorageConfig};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub use auth::{CredentialVerifier, StaticCredentials};
pub use state::{AppState, AppStateBuilder};

/// Configuration for serving mailgate.
pub struct ServeConfig {
    /// The socket address (IP and port) the server will bind to
    pub listen_address: SocketAddr,
    /// The deserialized mailgate TOML configuration.
    pub config: Config,
}

/// Builds the application router around `state`.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();
    let server_config = &config.server;

    let protected_router = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/email-count", get(send::email_count))
        .route(
            "/send-email",
            post(send::send_email).layer(DefaultBodyLimit::max(server_config.max_upload_size)),
        )
        .layer(RequireLoginLayer::new(state.sessions.clone()));

    let mut app = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", post(pages::logout))
        .merge(protected_router);

    if server_config.health.enabled && server_config.health.listen.is_none() {
        app = app.route(&server_config.health.path, get(health::health));
    }

    app.fallback_service(ServeDir::new(&server_config.static_dir))
        .with_state(state)
}

/// Starts and runs the mailgate server with the provided configuration.
pub async fn serve(ServeConfig { listen_address, config }: ServeConfig) -> anyhow::Result<()> {
    let state = AppState::builder(config).build()?;

    serve_with_state(listen_address, state).await
}

/// Starts and runs the mailgate server with prepared state.
pub async fn serve_with_state(listen_address: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let config = state.config.clone();

    match &config.send_limit.storage {
        SendLogStorageConfig::File(file) => log::info!("Send log stored at {}", file.path.display()),
        SendLogStorageConfig::Memory => log::warn!("Send log is kept in memory and resets on restart"),
    }

    // Creates the log on first start, like every later read would.
    if let Err(e) = state.limiter.load().await {
        log::error!("Send log is not accessible, sends will be refused until it is: {e}");
    }

    log::debug!(
        "Login sessions expire after {} of inactivity",
        session::describe_timeout(config.server.session.idle_timeout)
    );

    let health = &config.server.health;

    if health.enabled
        && let Some(listen) = health.listen
    {
        health::spawn_health_endpoint(listen, health.clone());
    }

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("Failed to bind to {listen_address}: {e}"))?;

    log::info!("Mailgate available at: http://{listen_address}/");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("Failed to start HTTP server: {e}"))?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutting down"),
        Err(e) => {
            log::error!("Failed to listen for the shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
