use std::net::SocketAddr;
use std::sync::Arc;

use rainfall_core::{AppError, ServerConfig};
use rainfall_model::LoadState;

use crate::pages::Pages;
use crate::routes::routes;

/// Serve until Ctrl-C.
pub async fn serve(
    config: &ServerConfig,
    state: Arc<LoadState>,
    pages: Arc<Pages>,
) -> Result<(), AppError> {
    let addr = resolve_bind_address(config).await?;

    let (bound, server) = warp::serve(routes(state, pages))
        .try_bind_with_graceful_shutdown(addr, shutdown_signal())
        .map_err(|e| AppError::Server(format!("failed to bind {}: {}", addr, e)))?;

    tracing::info!("Listening on http://{}", bound);
    server.await;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve the configured host (IP literal or host name) to the first
/// socket address it maps to.
pub async fn resolve_bind_address(config: &ServerConfig) -> Result<SocketAddr, AppError> {
    let target = config.bind_address();

    let mut addrs = tokio::net::lookup_host(target.as_str())
        .await
        .map_err(|e| AppError::Server(format!("cannot resolve bind address {}: {}", target, e)))?;

    let addr = addrs
        .next()
        .ok_or_else(|| AppError::Server(format!("bind address {} resolved to nothing", target)))?;

    tracing::debug!("Resolved {} to {}", target, addr);
    Ok(addr)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        // without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
