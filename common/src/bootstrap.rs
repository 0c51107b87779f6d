// Bootstrap utilities for binary initialization
// Wires the HTTP transport, probe executor and runner from a RunConfig

use crate::config::RunConfig;
use crate::executor::{HttpTransport, LoggingTransport, ProbeExecutor, ReqwestTransport};
use crate::runner::Runner;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Build the shared HTTP transport, wrapped in the logging transport when enabled
///
/// # Errors
/// Returns error if the underlying HTTP client cannot be created
pub fn build_transport(config: &RunConfig) -> Result<Arc<dyn HttpTransport>> {
    let transport = ReqwestTransport::from_timeout_seconds(config.timeout_seconds)
        .context("Failed to create HTTP client")?;

    info!(
        timeout_seconds = config.timeout_seconds,
        http_logging = config.http_logging_enabled,
        "HTTP client initialized"
    );

    if config.http_logging_enabled {
        Ok(Arc::new(LoggingTransport::new(transport)))
    } else {
        Ok(Arc::new(transport))
    }
}

/// Build a runner probing every configured endpoint through a fresh transport
///
/// # Errors
/// Returns error if the HTTP client cannot be created
pub fn build_runner(config: RunConfig) -> Result<Runner> {
    let transport = build_transport(&config)?;
    let executor = ProbeExecutor::new(transport, config.headers.clone());

    Ok(Runner::new(config, Arc::new(executor)))
}

/// Resolve when the process receives Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM signal, initiating graceful shutdown"),
    }
}
