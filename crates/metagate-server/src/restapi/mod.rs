//! REST API module

pub mod handlers;
pub mod router;

pub use router::create_router;

use crate::{ApiError, AppState};
use std::net::SocketAddr;

/// Serve the controller surface
pub async fn serve(app_state: AppState, addr: &str) -> Result<(), ApiError> {
    let app = create_router(app_state);

    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ApiError::Internal(format!("invalid address: {e}")))?;

    tracing::info!("starting controller on {}", addr);

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to bind: {e}")))?,
        app,
    )
    .await
    .map_err(|e| ApiError::Internal(format!("server error: {e}")))?;

    Ok(())
}
