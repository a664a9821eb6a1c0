//! OS signal handling.

use tokio::sync::broadcast;

/// Resolve when Ctrl+C is received or `shutdown` fires.
pub async fn wait_for_shutdown(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                // Without a signal handler, only an explicit shutdown stops the server
                let _ = shutdown.recv().await;
            }
            tracing::info!("Shutdown signal received");
        }
        _ = shutdown.recv() => {
            tracing::info!("Shutdown requested");
        }
    }
}
