//! HTTP server lifecycle
//!
//! Binds the review API, serves it until Ctrl+C or SIGTERM, then logs the
//! final collection size.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};

use crate::{
    config::Settings,
    server::{routes, state::AppState},
};

/// The flashcard API server
pub struct App {
    settings: Settings,
    state: AppState,
}

impl App {
    /// Build the DynamoDB client and the collection store from settings.
    pub async fn new(settings: Settings) -> Result<Self> {
        let state = AppState::new(settings.clone()).await?;
        Ok(Self::from_state(settings, state))
    }

    /// Wrap an already built state.
    pub fn from_state(settings: Settings, state: AppState) -> Self {
        Self { settings, state }
    }

    /// Bind the configured `host:port`.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr: SocketAddr = self
            .settings
            .server_addr()
            .parse()
            .with_context(|| format!("Invalid listen address {}", self.settings.server_addr()))?;

        TcpListener::bind(addr)
            .await
            .with_context(|| format!("Unable to bind {}", addr))
    }

    /// Serve until the process is killed.
    pub async fn run(self) -> Result<()> {
        let listener = self.bind().await?;
        tracing::info!(addr = %listener.local_addr()?, "Serving flashcard API");

        axum::serve(listener, routes::create_router(self.state)).await?;

        Ok(())
    }

    /// Serve until Ctrl+C or SIGTERM, letting in-flight requests finish.
    pub async fn run_with_graceful_shutdown(self) -> Result<()> {
        let listener = self.bind().await?;
        tracing::info!(addr = %listener.local_addr()?, "Serving flashcard API with graceful shutdown");

        axum::serve(listener, routes::create_router(self.state.clone()))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.log_final_state().await;

        Ok(())
    }

    async fn log_final_state(&self) {
        match self.state.data.fetch_collection().await {
            Ok(collection) => tracing::info!(
                decks = collection.decks.len(),
                uptime_seconds = self.state.uptime_seconds(),
                "Collection store released"
            ),
            Err(e) => tracing::warn!(error = %e, "Unable to read collection during shutdown"),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// Resolves on Ctrl+C, or SIGTERM on unix. A handler that cannot be
/// installed never resolves, leaving the other one in charge.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
