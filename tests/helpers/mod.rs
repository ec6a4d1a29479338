//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use pixelmagix_core::config::{
    AppConfig, DatabaseConfig, LoggingConfig, PluginConfig, ServerConfig, StorageConfig,
};
use pixelmagix_database::DatabasePool;
use pixelmagix_plugin::{PluginCatalog, PluginManager};
use pixelmagix_service::SettingService;

/// Boundary used for multipart bodies.
const BOUNDARY: &str = "pixelmagix-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Database pool for direct queries
    pub db_pool: SqlitePool,
    /// Plugin manager shared with the router
    pub plugins: Arc<PluginManager>,
    /// Application config
    pub config: Arc<AppConfig>,
    /// Owns the data directories
    pub dir: TempDir,
}

/// Test response wrapper
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// Raw body
    pub text: String,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }
}

impl TestApp {
    /// Create a new test application on a fresh in-memory database.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::in_memory(),
            storage: StorageConfig {
                data_root: root.to_string_lossy().into_owned(),
                media_dir: root.join("media").to_string_lossy().into_owned(),
                export_dir: root.join("exports").to_string_lossy().into_owned(),
                max_upload_size_bytes: 1024 * 1024,
            },
            plugins: PluginConfig {
                directory: root.join("plugins").to_string_lossy().into_owned(),
                auto_load: true,
            },
            logging: LoggingConfig::default(),
        };

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        pixelmagix_database::migration::run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");
        let db_pool = db.into_pool();

        SettingService::new(Arc::new(
            pixelmagix_database::repositories::setting::SettingRepository::new(db_pool.clone()),
        ))
        .seed_defaults(&config.storage)
        .await
        .expect("Failed to seed settings");

        let plugins = Arc::new(PluginManager::new(
            db_pool.clone(),
            PluginCatalog::with_builtins(),
            &config.plugins.directory,
        ));

        let config = Arc::new(config);
        let state =
            pixelmagix_api::AppState::new(Arc::clone(&config), db_pool.clone(), Arc::clone(&plugins));
        let router = pixelmagix_api::build_app(state);

        Self {
            router,
            db_pool,
            plugins,
            config,
            dir,
        }
    }

    /// Make a JSON request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload a single file as the `file` field of a multipart form.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .expect("Failed to write multipart head");
        body.extend_from_slice(data);
        write!(body, "\r\n--{BOUNDARY}--\r\n").expect("Failed to write multipart tail");

        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body, text }
    }

    /// Install a built-in plugin with the given hooks and activate it.
    pub async fn install_builtin(
        &self,
        slug: &str,
        entry_point: &str,
        hooks: &[&str],
        config: Value,
    ) -> TestResponse {
        let hooks: Vec<Value> = hooks
            .iter()
            .map(|h| json!({ "hook_name": h, "handler": h, "priority": 10 }))
            .collect();

        let installed = self
            .request(
                "POST",
                "/api/plugins",
                Some(json!({
                    "slug": slug,
                    "name": slug,
                    "version": "1.0.0",
                    "entry_point": entry_point,
                    "config": config,
                    "hooks": hooks,
                })),
            )
            .await;
        assert_eq!(installed.status, StatusCode::CREATED, "{}", installed.text);

        self.request("POST", &format!("/api/plugins/{slug}/activate"), None)
            .await
    }

    /// Create a page and return its JSON representation.
    pub async fn create_page(&self, body: Value) -> Value {
        let response = self.request("POST", "/api/pages", Some(body)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.data().clone()
    }
}

/// Build a zip archive from `(path, contents)` pairs.
pub fn zip_archive(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer
            .start_file(*name, options)
            .expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer
        .finish()
        .expect("Failed to finish zip")
        .into_inner()
}
