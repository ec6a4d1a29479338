//! PixelMagix Server: landing page CMS with a plugin hook system
//!
//! Main entry point that wires all crates together and starts the server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use pixelmagix_core::config::AppConfig;
use pixelmagix_core::error::AppError;
use pixelmagix_database::DatabasePool;
use pixelmagix_plugin::{PluginCatalog, PluginManager};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and `PIXELMAGIX__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PIXELMAGIX_ENV").unwrap_or_else(|_| "development".to_string());
    match std::env::var("PIXELMAGIX_CONFIG_DIR") {
        Ok(dir) => AppConfig::load_from(&PathBuf::from(dir), &env),
        Err(_) => AppConfig::load(&env),
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting PixelMagix v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Create data directories ──────────────────────────
    create_data_directories(&config).await?;

    // ── Step 2: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    pixelmagix_database::migration::run_migrations(db.pool()).await?;
    tracing::info!("Database migrations complete");
    let db_pool = db.into_pool();

    // ── Step 3: Seed default settings ────────────────────────────
    let setting_service = pixelmagix_service::SettingService::new(Arc::new(
        pixelmagix_database::repositories::setting::SettingRepository::new(db_pool.clone()),
    ));
    let seeded = setting_service.seed_defaults(&config.storage).await?;
    if seeded > 0 {
        tracing::info!("Seeded {} default settings", seeded);
    }

    // ── Step 4: Initialize plugin manager ────────────────────────
    tracing::info!("Initializing plugin system...");
    let catalog = PluginCatalog::with_builtins();
    let plugin_manager = Arc::new(PluginManager::new(
        db_pool.clone(),
        catalog,
        &config.plugins.directory,
    ));

    if config.plugins.auto_load {
        let summary = plugin_manager.load_all().await?;
        tracing::info!(
            "Plugins loaded: {} ok, {} failed",
            summary.loaded.len(),
            summary.failed.len()
        );
    } else {
        tracing::info!("Plugin auto-load disabled");
    }

    // ── Step 5: Build application state ──────────────────────────
    let config = Arc::new(config);
    let state = pixelmagix_api::AppState::new(
        Arc::clone(&config),
        db_pool.clone(),
        Arc::clone(&plugin_manager),
    );

    // ── Step 6: Build and start HTTP server ──────────────────────
    let app = pixelmagix_api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("PixelMagix server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Tear down plugins and close the pool ─────────────
    plugin_manager.shutdown().await;
    db_pool.close().await;

    tracing::info!("PixelMagix server shut down gracefully");
    Ok(())
}

/// Create the runtime data directories.
async fn create_data_directories(config: &AppConfig) -> Result<(), AppError> {
    let dirs = [
        config.storage.data_root.as_str(),
        config.storage.media_dir.as_str(),
        config.storage.export_dir.as_str(),
        config.plugins.directory.as_str(),
    ];

    for dir in dirs {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::internal(format!("Failed to create dir '{dir}': {e}")))?;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
