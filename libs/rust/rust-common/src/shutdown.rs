//! Graceful shutdown signal handling.
//!
//! Resolves once the process is asked to stop, for use with
//! `axum::serve(..).with_graceful_shutdown`.

use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// Waits for SIGTERM or SIGINT.
///
/// If a handler cannot be installed the corresponding branch never fires and
/// the failure is logged.
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

/// Resolves `timeout` after a shutdown signal.
///
/// Race it against the server future to bound how long open connections may
/// keep draining.
pub async fn drain_deadline(timeout: Duration) {
    wait_for_signal().await;
    tokio::time::sleep(timeout).await;
    warn!(timeout_secs = timeout.as_secs(), "Shutdown timeout reached, dropping open connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_without_signal() {
        let result = tokio::time::timeout(Duration::from_millis(50), wait_for_signal()).await;
        assert!(result.is_err());
    }
}
