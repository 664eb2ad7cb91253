//! Process plumbing shared by both services: tracing setup and
//! graceful shutdown with a bounded drain.

use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drain timeout after a shutdown signal (graceful shutdown <5s)
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

/// Serve `app` until SIGINT/SIGTERM, then drain in-flight requests.
///
/// The drain deadline starts when the signal fires, not when the server
/// starts: the server is told to drain, then raced against `drain_timeout`.
pub async fn serve_until_signal(
    listener: TcpListener,
    app: Router,
    drain_timeout: Duration,
) -> std::io::Result<()> {
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    shutdown_signal().await;
    let _ = shutdown_tx.send(());

    match tokio::time::timeout(drain_timeout, server_handle).await {
        Ok(Ok(Ok(()))) => {
            info!("all in-flight requests drained");
            Ok(())
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server error during shutdown");
            Err(e)
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task panicked");
            Ok(())
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = drain_timeout.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
            Ok(())
        }
    }
}

/// Wait for SIGTERM or SIGINT.
///
/// If a handler cannot be installed that branch never resolves; the other
/// signal still works.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
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
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
