//! Route definitions for the PixelMagix HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(health_routes())
        .merge(page_routes())
        .merge(asset_routes())
        .merge(setting_routes())
        .merge(plugin_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Page CRUD, render and export
fn page_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/pages",
            get(handlers::pages::list_pages).post(handlers::pages::create_page),
        )
        .route(
            "/pages/{id}",
            get(handlers::pages::get_page)
                .put(handlers::pages::update_page)
                .delete(handlers::pages::delete_page),
        )
        .route("/pages/by-slug/{slug}", get(handlers::pages::get_page_by_slug))
        .route("/pages/{id}/render", get(handlers::pages::render_page))
        .route("/pages/{id}/export", post(handlers::pages::export_page))
}

/// Asset upload, listing and download
fn asset_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/assets",
            get(handlers::assets::list_assets).post(handlers::assets::upload_asset),
        )
        .route(
            "/assets/{id}",
            get(handlers::assets::get_asset).delete(handlers::assets::delete_asset),
        )
        .route("/assets/{id}/file", get(handlers::assets::download_asset))
}

/// Settings
fn setting_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(handlers::settings::list_settings))
        .route(
            "/settings/{key}",
            get(handlers::settings::get_setting).put(handlers::settings::update_setting),
        )
}

/// Plugin lifecycle and introspection
fn plugin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/plugins",
            get(handlers::plugins::list_plugins).post(handlers::plugins::install_plugin),
        )
        .route("/plugins/upload", post(handlers::plugins::upload_plugin))
        .route(
            "/plugins/editor-blocks",
            get(handlers::plugins::editor_blocks),
        )
        .route(
            "/plugins/frontend-components",
            get(handlers::plugins::frontend_components),
        )
        .route(
            "/plugins/hooks/{event}",
            get(handlers::plugins::hooks_for_event),
        )
        .route(
            "/plugins/{slug}",
            get(handlers::plugins::get_plugin).delete(handlers::plugins::uninstall_plugin),
        )
        .route(
            "/plugins/{slug}/activate",
            post(handlers::plugins::activate_plugin),
        )
        .route(
            "/plugins/{slug}/deactivate",
            post(handlers::plugins::deactivate_plugin),
        )
        .route(
            "/plugins/{slug}/config",
            put(handlers::plugins::update_plugin_config),
        )
}
