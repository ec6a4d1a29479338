//! Asset repository implementation.

use chrono::Utc;
use sqlx::SqlitePool;

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_core::result::AppResult;
use pixelmagix_entity::asset::{Asset, AssetKind, CreateAsset};

/// Repository for uploaded asset records.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: SqlitePool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find an asset by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find asset", e))
    }

    /// List assets, newest first, optionally restricted to one kind.
    pub async fn find_all(&self, kind: Option<AssetKind>) -> AppResult<Vec<Asset>> {
        let query = match kind {
            Some(kind) => sqlx::query_as::<_, Asset>(
                "SELECT * FROM assets WHERE file_type = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(kind),
            None => {
                sqlx::query_as::<_, Asset>("SELECT * FROM assets ORDER BY created_at DESC, id DESC")
            }
        };

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list assets", e))
    }

    /// Record a new asset.
    pub async fn create(&self, data: &CreateAsset) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "INSERT INTO assets (name, file_path, file_type, mime_type, size, metadata, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.file_path)
        .bind(data.file_type)
        .bind(&data.mime_type)
        .bind(data.size)
        .bind(&data.metadata)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create asset", e))
    }

    /// Delete an asset record. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM assets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete asset", e))?;
        Ok(result.rows_affected() > 0)
    }
}
