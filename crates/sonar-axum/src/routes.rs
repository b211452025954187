//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::bootstrap::AxumContext;
use crate::handlers;
use crate::state::AppState;

/// JSON routes, without the `/api` prefix.
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/detect", post(handlers::api::detect))
        .route("/alert/stop", post(handlers::api::stop_alert))
        .route("/status", get(handlers::api::status))
}

/// Build the full router: the page, the JSON API and the health check.
pub fn create_router(ctx: AxumContext) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/", get(handlers::page::index))
        .route("/detect", post(handlers::page::detect))
        .route("/stop", post(handlers::page::stop))
        .route("/health", get(handlers::api::health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
