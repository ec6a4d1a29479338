//! Application builder: wires router and layers into an Axum app.

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and layers.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
