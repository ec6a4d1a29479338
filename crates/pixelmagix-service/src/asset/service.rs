//! Asset upload, listing, download and deletion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use pixelmagix_core::config::StorageConfig;
use pixelmagix_core::error::AppError;
use pixelmagix_database::repositories::asset::AssetRepository;
use pixelmagix_entity::asset::{Asset, AssetKind, CreateAsset};

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadAsset {
    /// Original file name.
    pub file_name: String,
    /// Content type claimed by the client.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

/// Manages uploaded media.
#[derive(Debug, Clone)]
pub struct AssetService {
    /// Asset repository.
    repo: Arc<AssetRepository>,
    /// Storage configuration.
    config: StorageConfig,
}

impl AssetService {
    /// Creates a new asset service.
    pub fn new(repo: Arc<AssetRepository>, config: StorageConfig) -> Self {
        Self { repo, config }
    }

    /// Lists assets, newest first, optionally of one kind.
    pub async fn list(&self, kind: Option<AssetKind>) -> Result<Vec<Asset>, AppError> {
        self.repo.find_all(kind).await
    }

    /// Gets an asset.
    pub async fn get(&self, id: i64) -> Result<Asset, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Asset {id} not found")))
    }

    /// Stores an uploaded file under a random name and records it.
    pub async fn upload(&self, params: UploadAsset) -> Result<Asset, AppError> {
        let original = sanitize_file_name(&params.file_name)
            .ok_or_else(|| AppError::validation("A file name is required"))?;
        if params.data.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }
        if params.data.len() as u64 > self.config.max_upload_size_bytes {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.config.max_upload_size_bytes
            )));
        }

        let mime_type = mime_guess::from_path(&original)
            .first_raw()
            .map(str::to_string)
            .or(params.content_type)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let kind = AssetKind::from_mime(&mime_type);

        let stored_name = match Path::new(&original).extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext.to_string_lossy().to_lowercase()),
            None => Uuid::new_v4().to_string(),
        };
        let media_dir = self.config.media_path();
        tokio::fs::create_dir_all(&media_dir).await?;
        let path = media_dir.join(&stored_name);
        tokio::fs::write(&path, &params.data).await?;

        let record = CreateAsset {
            name: original.clone(),
            file_path: path.to_string_lossy().into_owned(),
            file_type: kind,
            mime_type,
            size: params.data.len() as i64,
            metadata: json!({ "original_filename": original }),
        };

        let asset = match self.repo.create(&record).await {
            Ok(asset) => asset,
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(e);
            }
        };

        info!(
            asset_id = asset.id,
            name = %asset.name,
            kind = %asset.file_type.as_str(),
            size = asset.size,
            "Asset uploaded"
        );
        Ok(asset)
    }

    /// Deletes the stored file, then the record.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let asset = self.get(id).await?;

        match tokio::fs::remove_file(&asset.file_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(asset_id = id, path = %asset.file_path, "Asset file already missing");
            }
            Err(e) => return Err(e.into()),
        }

        self.repo.delete(id).await?;
        info!(asset_id = id, "Asset deleted");
        Ok(())
    }

    /// Opens the stored file for streaming.
    pub async fn open(&self, id: i64) -> Result<(Asset, tokio::fs::File), AppError> {
        let asset = self.get(id).await?;
        let file = tokio::fs::File::open(PathBuf::from(&asset.file_path))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    AppError::not_found(format!("File of asset {id} is missing"))
                }
                _ => e.into(),
            })?;
        Ok((asset, file))
    }
}

/// Keeps only the final path component of a client-supplied file name.
fn sanitize_file_name(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}
