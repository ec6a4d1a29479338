//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pixelmagix_entity::plugin::PluginWithHooks;
use pixelmagix_entity::setting::{Setting, SettingType};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Number of loaded plugins.
    pub loaded_plugins: usize,
}

/// A setting with its value decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingResponse {
    /// Setting key.
    pub key: String,
    /// Typed value.
    pub value: serde_json::Value,
    /// Stored type.
    pub value_type: SettingType,
    /// Description.
    pub description: Option<String>,
    /// Last write.
    pub updated_at: DateTime<Utc>,
}

impl From<Setting> for SettingResponse {
    fn from(setting: Setting) -> Self {
        Self {
            value: setting.typed_value(),
            key: setting.key,
            value_type: setting.value_type,
            description: setting.description,
            updated_at: setting.updated_at,
        }
    }
}

/// A plugin record with its hooks and load state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Record and hook rows.
    #[serde(flatten)]
    pub plugin: PluginWithHooks,
    /// Whether an instance is currently loaded.
    pub is_loaded: bool,
}
