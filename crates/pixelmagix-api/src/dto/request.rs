//! Request DTOs.

use serde::{Deserialize, Serialize};

use pixelmagix_entity::asset::AssetKind;

/// PUT /api/settings/{key}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettingRequest {
    /// New value. Its JSON type decides the stored type.
    pub value: serde_json::Value,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// PUT /api/plugins/{slug}/config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePluginConfigRequest {
    /// Replacement configuration object.
    pub config: serde_json::Value,
}

/// POST /api/pages/{id}/export
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportQuery {
    /// Also build a zip archive of the export directory.
    #[serde(default)]
    pub archive: bool,
}

/// GET /api/assets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetListQuery {
    /// Only list assets of this kind.
    #[serde(default)]
    pub file_type: Option<AssetKind>,
}
