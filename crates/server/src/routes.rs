//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let max_upload_size = state.config.server.max_upload_size;

    Router::new()
        // Unauthenticated so load balancers can probe it
        .route("/health", get(handlers::health_check))
        .route("/files/{key}", get(handlers::get_file))
        .route("/files/{key}/{name}", get(handlers::get_named_file))
        .route(
            "/uploads/{user}",
            post(handlers::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/uploads/{user}/{key}", delete(handlers::delete_upload))
        .route(
            "/uploads/{user}/{key}/delete/{secret}",
            get(handlers::delete_public),
        )
        // Resolves bearer tokens into AuthenticatedUser; handlers decide whether one is required
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
