//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers;
use super::handlers::AppState;

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Question answering
        .route("/ask", post(handlers::ask))
        // Health and probes
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::readiness))
        .route("/live", get(handlers::liveness))
        .with_state(state)
}
