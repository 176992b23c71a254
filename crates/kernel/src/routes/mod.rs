//! HTTP route handlers.

pub mod config;
pub mod health;

use axum::Router;

use crate::error::ApiError;
use crate::registry::ServerHandle;
use crate::state::AppState;

/// Routes the kernel itself serves. Boot seeds the server with these before
/// any application registers, so a conflicting application route is reported
/// against that application.
pub fn kernel_routes() -> Router<AppState> {
    Router::new().merge(config::router()).merge(health::router())
}

/// Unmatched paths get the error envelope rather than an empty body.
async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Attach the per-request layers to the booted server and bind the state.
///
/// Layers run outermost first: domain resolution, then authentication.
pub fn build_router(state: AppState, server: ServerHandle) -> Router {
    server
        .into_router()
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::authenticate,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::resolve_app,
        ))
        .with_state(state)
}
