//! Route table for the controller surface

use crate::{
    middleware::{IdentityLayer, TransactionIdLayer},
    AppState,
};
use axum::{
    routing::{any, get, post},
    Router,
};
use tower::ServiceBuilder;

/// Create the controller router.
///
/// The meta surface is mounted with `any()` so the handler owns the verb
/// allow-list; route-level method filtering would answer 405 without the
/// resolution pipeline ever seeing the request.
pub fn create_router(app_state: AppState) -> Router {
    let api_root = app_state.config.api_root();
    let meta_root = app_state.config.meta_root();

    Router::new()
        .route(&meta_root, any(super::handlers::meta::meta_root))
        .route(
            &format!("{meta_root}/*path"),
            any(super::handlers::meta::handle_meta),
        )
        .route(
            &format!("{api_root}/namespaces/:namespace/triggers/:trigger"),
            post(super::handlers::triggers::fire_trigger),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TransactionIdLayer)
                .layer(IdentityLayer::new(app_state.auths.clone())),
        )
        // Added after the layers so probes skip authentication
        .route(&format!("{api_root}/health"), get(super::handlers::health::health_check))
        .with_state(app_state)
}
