//! HSLTalks Server
//!
//! Serves the split-screen page and the scripted chat endpoint:
//! - `GET /` full page
//! - `POST /handle` user bubble + next scripted reply
//! - `/static/*` asset directory (reply images)

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use config::{Cli, ServerConfig};
pub use routes::{build_router, Route};
pub use state::AppState;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn run(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;

    if !config.static_dir.is_dir() {
        warn!(
            "Static directory not found, reply images will 404: path={}",
            config.static_dir.display()
        );
    }

    state::spawn_session_pruner(
        state.sessions.clone(),
        Duration::from_secs(config.session_idle_secs),
        Duration::from_secs(config.prune_interval_secs),
    );

    let app = build_router(state, &config.static_dir);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(
        "HSLTalks server v{} listening: addr={}",
        VERSION,
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("HSLTalks server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
