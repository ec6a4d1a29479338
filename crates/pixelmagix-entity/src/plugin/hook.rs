//! Plugin hook declaration entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted hook declaration belonging to one plugin.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PluginHook {
    /// Unique hook row identifier.
    pub id: i64,
    /// Owning plugin.
    pub plugin_id: i64,
    /// Lifecycle event name (e.g. `"before_page_save"`).
    pub hook_name: String,
    /// Handler name resolved against the loaded instance.
    pub handler: String,
    /// Lower runs first.
    pub priority: i32,
}

/// Data required to declare a hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePluginHook {
    /// Lifecycle event name.
    pub hook_name: String,
    /// Handler name.
    pub handler: String,
    /// Priority.
    pub priority: i32,
}
