use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::db::AccountsStorage;
use crate::error::BootError;
use crate::router::{AppState, app_router};

/// Bind `addr` and serve until the process receives SIGINT or SIGTERM.
pub async fn serve(storage: AccountsStorage, addr: String) -> Result<(), BootError> {
    let app = app_router(AppState::new(storage));

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
