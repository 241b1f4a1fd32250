//! Process stop signals.

use tokio::signal::unix::{SignalKind, signal};

/// Resolves once the process is asked to stop.
///
/// Both SIGTERM (service manager) and SIGINT (Ctrl+C) count; whichever
/// arrives first starts the poller drain.
pub async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("SIGTERM received, draining event pollers");
        }
        _ = sigint.recv() => {
            tracing::info!("SIGINT received, draining event pollers");
        }
    }
}
