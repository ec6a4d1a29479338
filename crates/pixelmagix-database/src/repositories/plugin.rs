//! Plugin repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_core::result::AppResult;
use pixelmagix_entity::plugin::{CreatePlugin, Plugin, PluginHook, PluginWithHooks};

/// Repository for installed plugins and their hook declarations.
#[derive(Debug, Clone)]
pub struct PluginRepository {
    pool: SqlitePool,
}

impl PluginRepository {
    /// Create a new plugin repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a plugin by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Plugin>> {
        sqlx::query_as::<_, Plugin>("SELECT * FROM plugins WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find plugin", e))
    }

    /// List all plugins ordered by installation.
    pub async fn find_all(&self) -> AppResult<Vec<Plugin>> {
        sqlx::query_as::<_, Plugin>("SELECT * FROM plugins ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugins", e))
    }

    /// List plugins with the active flag set.
    pub async fn find_active(&self) -> AppResult<Vec<Plugin>> {
        sqlx::query_as::<_, Plugin>("SELECT * FROM plugins WHERE is_active = 1 ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list active plugins", e)
            })
    }

    /// Hook declarations of a plugin in declaration order.
    pub async fn hooks_for(&self, plugin_id: i64) -> AppResult<Vec<PluginHook>> {
        sqlx::query_as::<_, PluginHook>(
            "SELECT * FROM plugin_hooks WHERE plugin_id = ? ORDER BY id",
        )
        .bind(plugin_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list plugin hooks", e))
    }

    /// Find a plugin together with its hooks.
    pub async fn find_with_hooks(&self, slug: &str) -> AppResult<Option<PluginWithHooks>> {
        let Some(plugin) = self.find_by_slug(slug).await? else {
            return Ok(None);
        };
        let hooks = self.hooks_for(plugin.id).await?;
        Ok(Some(PluginWithHooks { plugin, hooks }))
    }

    /// Persist a plugin and all its hook rows in one transaction.
    ///
    /// A unique-slug violation maps to [`ErrorKind::Conflict`]; nothing is
    /// written when any insert fails.
    pub async fn create_with_hooks(&self, data: &CreatePlugin) -> AppResult<PluginWithHooks> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        let now = Utc::now();

        let plugin = sqlx::query_as::<_, Plugin>(
            "INSERT INTO plugins (slug, name, description, version, author, entry_point, \
             is_active, config, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.slug)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.version)
        .bind(&data.author)
        .bind(&data.entry_point)
        .bind(data.is_active)
        .bind(&data.config)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false);
            if unique {
                AppError::with_source(
                    ErrorKind::Conflict,
                    format!("Plugin '{}' is already installed", data.slug),
                    e,
                )
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create plugin", e)
            }
        })?;

        let mut hooks = Vec::with_capacity(data.hooks.len());
        for hook in &data.hooks {
            let row = sqlx::query_as::<_, PluginHook>(
                "INSERT INTO plugin_hooks (plugin_id, hook_name, handler, priority) \
                 VALUES (?, ?, ?, ?) RETURNING *",
            )
            .bind(plugin.id)
            .bind(&hook.hook_name)
            .bind(&hook.handler)
            .bind(hook.priority)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to create plugin hook", e)
            })?;
            hooks.push(row);
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit plugin install", e)
        })?;

        Ok(PluginWithHooks { plugin, hooks })
    }

    /// Set the activation flag.
    pub async fn set_active(&self, slug: &str, active: bool) -> AppResult<Option<Plugin>> {
        sqlx::query_as::<_, Plugin>(
            "UPDATE plugins SET is_active = ?, updated_at = ? WHERE slug = ? RETURNING *",
        )
        .bind(active)
        .bind(Utc::now())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update plugin", e))
    }

    /// Replace the configuration blob.
    pub async fn update_config(
        &self,
        slug: &str,
        config: &serde_json::Value,
    ) -> AppResult<Option<Plugin>> {
        sqlx::query_as::<_, Plugin>(
            "UPDATE plugins SET config = ?, updated_at = ? WHERE slug = ? RETURNING *",
        )
        .bind(config)
        .bind(Utc::now())
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update plugin config", e)
        })
    }

    /// Delete a plugin and its hook rows. Returns whether a plugin was removed.
    pub async fn delete(&self, slug: &str) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "DELETE FROM plugin_hooks WHERE plugin_id IN (SELECT id FROM plugins WHERE slug = ?)",
        )
        .bind(slug)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete plugin hooks", e))?;

        let result = sqlx::query("DELETE FROM plugins WHERE slug = ?")
            .bind(slug)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete plugin", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit plugin removal", e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
