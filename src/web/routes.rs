//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(handlers::index))
        .route("/search", post(handlers::search))
        .route("/retry", post(handlers::retry))
        .route("/reset", post(handlers::reset))
        .route("/tier", post(handlers::toggle_tier))
        // API routes
        .route("/api/state", get(handlers::api_state))
        .route("/api/search", post(handlers::api_search))
        .route("/api/reset", post(handlers::api_reset))
        .route("/health", get(handlers::health))
        // Add middleware
        .layer(CompressionLayer::new())
        .layer(cors)
        // Add state
        .with_state(state)
}
