//! Startup helpers for the chat proxy server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::{ConfigError, ServerConfig};
use crate::server::{self, AppState};

/// Install the global `tracing` subscriber, filtered by `RUST_LOG` with an `info` floor.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

/// Run the proxy server (used by the `codehelper-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting CodeHelper chat proxy v{}", env!("CARGO_PKG_VERSION"));

    let (config, state) = match initialize() {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!("Failed to initialize: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(server::run_server_with_shutdown(state, config.port, shutdown_signal())) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Chat proxy stopped");
    ExitCode::SUCCESS
}

/// Load configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if configuration is invalid or state creation fails.
pub fn initialize() -> Result<(ServerConfig, Arc<AppState>), ConfigError> {
    let config = ServerConfig::from_env()?;
    tracing::info!("Backend endpoint: {}", config.backend.base_url());
    let state = AppState::new(&config)?;
    Ok((config, state))
}

/// Resolves on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl+C handler failed: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
