//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::AssetKind;

/// An uploaded media file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Unique asset identifier.
    pub id: i64,
    /// Display name (the original file name).
    pub name: String,
    /// Path of the stored file.
    pub file_path: String,
    /// Media category.
    pub file_type: AssetKind,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Metadata such as the original file name (JSON object).
    pub metadata: serde_json::Value,
    /// When the asset was uploaded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a new asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAsset {
    /// Display name.
    pub name: String,
    /// Path of the stored file.
    pub file_path: String,
    /// Media category.
    pub file_type: AssetKind,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: i64,
    /// Metadata.
    pub metadata: serde_json::Value,
}
