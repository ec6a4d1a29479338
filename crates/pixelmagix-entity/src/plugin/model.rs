//! Installed plugin entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::hook::{CreatePluginHook, PluginHook};

/// A persisted plugin record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plugin {
    /// Unique plugin identifier.
    pub id: i64,
    /// Unique lookup key.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Version string (not parsed).
    pub version: String,
    /// Author.
    pub author: String,
    /// Catalog key resolving to the implementation.
    pub entry_point: String,
    /// Whether the plugin should be loaded.
    pub is_active: bool,
    /// Plugin configuration (JSON object).
    pub config: serde_json::Value,
    /// When the plugin was installed.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A plugin record with its declared hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginWithHooks {
    /// The plugin row.
    #[serde(flatten)]
    pub plugin: Plugin,
    /// Declared hooks in declaration order.
    pub hooks: Vec<PluginHook>,
}

/// Data required to install a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlugin {
    /// Unique lookup key.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Version string.
    pub version: String,
    /// Author.
    pub author: String,
    /// Catalog key.
    pub entry_point: String,
    /// Initial activation flag.
    pub is_active: bool,
    /// Initial configuration.
    pub config: serde_json::Value,
    /// Declared hooks.
    pub hooks: Vec<CreatePluginHook>,
}
