//! Media and export storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Filesystem locations for runtime data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory that uploaded assets are written to.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    /// Directory that static page exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    /// Maximum upload size in bytes (default 50 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            media_dir: default_media_dir(),
            export_dir: default_export_dir(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

impl StorageConfig {
    /// Media directory as a path.
    pub fn media_path(&self) -> PathBuf {
        PathBuf::from(&self.media_dir)
    }

    /// Export directory as a path.
    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export_dir)
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_media_dir() -> String {
    "./data/media".to_string()
}

fn default_export_dir() -> String {
    "./data/exports".to_string()
}

fn default_max_upload() -> u64 {
    50 * 1024 * 1024
}
