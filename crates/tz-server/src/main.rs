use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tz_core::AppConfig;
use tz_server::{app_with_state, logging::init_logging, state::AppState};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let _log_guard = init_logging(&config.logging);

    let addr = config.bind_addr();
    let state = AppState::new(config);
    spawn_sweeper(state.clone());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, production = state.config.server.production, csrf = state.config.csrf.enabled, "Server listening");

    axum::serve(listener, app_with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Drops expired sessions and cache entries once a minute.
fn spawn_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let sessions = state.sessions.purge_expired();
            let responses = state.cache.purge_expired();
            debug!(sessions, responses, "Purged expired entries");
        }
    });
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
