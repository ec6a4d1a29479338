//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use pixelmagix_core::config::AppConfig;
use pixelmagix_database::repositories::asset::AssetRepository;
use pixelmagix_database::repositories::page::PageRepository;
use pixelmagix_database::repositories::setting::SettingRepository;
use pixelmagix_plugin::PluginManager;
use pixelmagix_service::{AssetService, ExportService, PageService, SettingService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db_pool: SqlitePool,
    /// Plugin manager (registry, loader and hook dispatcher)
    pub plugins: Arc<PluginManager>,

    // ── Services ─────────────────────────────────────────────
    /// Page CRUD and rendering
    pub page_service: Arc<PageService>,
    /// Static export
    pub export_service: Arc<ExportService>,
    /// Uploaded media
    pub asset_service: Arc<AssetService>,
    /// Site settings
    pub setting_service: Arc<SettingService>,
}

impl AppState {
    /// Wires repositories and services around an existing pool and plugin
    /// manager.
    pub fn new(config: Arc<AppConfig>, db_pool: SqlitePool, plugins: Arc<PluginManager>) -> Self {
        let page_repo = Arc::new(PageRepository::new(db_pool.clone()));
        let asset_repo = Arc::new(AssetRepository::new(db_pool.clone()));
        let setting_repo = Arc::new(SettingRepository::new(db_pool.clone()));

        let page_service = PageService::new(page_repo, plugins.clone());
        let export_service = ExportService::new(page_service.clone(), config.storage.export_path());
        let asset_service = AssetService::new(asset_repo, config.storage.clone());
        let setting_service = SettingService::new(setting_repo);

        Self {
            config,
            db_pool,
            plugins,
            page_service: Arc::new(page_service),
            export_service: Arc::new(export_service),
            asset_service: Arc::new(asset_service),
            setting_service: Arc::new(setting_service),
        }
    }
}
