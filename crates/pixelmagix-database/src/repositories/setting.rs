//! Setting repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_core::result::AppResult;
use pixelmagix_entity::setting::{Setting, SettingType};

/// Repository for typed key/value settings.
#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    /// Create a new setting repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all settings ordered by key.
    pub async fn find_all(&self) -> AppResult<Vec<Setting>> {
        sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list settings", e))
    }

    /// Find a setting by key.
    pub async fn find_by_key(&self, key: &str) -> AppResult<Option<Setting>> {
        sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find setting", e))
    }

    /// Insert or replace a setting. An absent description keeps the stored one.
    pub async fn upsert(
        &self,
        key: &str,
        value: &str,
        value_type: SettingType,
        description: Option<&str>,
    ) -> AppResult<Setting> {
        sqlx::query_as::<_, Setting>(
            "INSERT INTO settings (key, value, value_type, description, updated_at) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, \
             value_type = excluded.value_type, \
             description = COALESCE(excluded.description, settings.description), \
             updated_at = excluded.updated_at \
             RETURNING *",
        )
        .bind(key)
        .bind(value)
        .bind(value_type)
        .bind(description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save setting", e))
    }

    /// Insert a setting only when the key is absent. Returns whether it was inserted.
    pub async fn insert_if_absent(
        &self,
        key: &str,
        value: &str,
        value_type: SettingType,
        description: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO settings (key, value, value_type, description, updated_at) \
             VALUES (?, ?, ?, ?, ?) ON CONFLICT(key) DO NOTHING",
        )
        .bind(key)
        .bind(value)
        .bind(value_type)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to seed setting", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::memory_pool;

    #[tokio::test]
    async fn test_upsert_overwrites_value_and_keeps_description() {
        let repo = SettingRepository::new(memory_pool().await);
        repo.upsert("site_name", "A", SettingType::String, Some("Site name"))
            .await
            .unwrap();
        let updated = repo
            .upsert("site_name", "B", SettingType::String, None)
            .await
            .unwrap();

        assert_eq!(updated.value, "B");
        assert_eq!(updated.description.as_deref(), Some("Site name"));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_if_absent_does_not_overwrite() {
        let repo = SettingRepository::new(memory_pool().await);
        assert!(
            repo.insert_if_absent("enable_ai", "true", SettingType::Boolean, None)
                .await
                .unwrap()
        );
        assert!(
            !repo
                .insert_if_absent("enable_ai", "false", SettingType::Boolean, None)
                .await
                .unwrap()
        );

        let setting = repo.find_by_key("enable_ai").await.unwrap().unwrap();
        assert_eq!(setting.typed_value(), serde_json::json!(true));
    }
}
