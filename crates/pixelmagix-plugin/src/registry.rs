//! Plugin registry: the only owner of loaded plugin instances.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::LiveConfig;
use crate::contract::Extension;

/// A loaded, initialized plugin.
pub struct LoadedPlugin {
    /// Plugin slug.
    pub slug: String,
    /// Entry point it was resolved from.
    pub entry_point: String,
    /// The instance.
    pub instance: Arc<dyn Extension>,
    /// Live configuration shared with its hook entries.
    pub config: LiveConfig,
    /// Number of hooks that were bound.
    pub bound_hooks: usize,
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("slug", &self.slug)
            .field("entry_point", &self.entry_point)
            .field("name", &self.instance.name())
            .field("bound_hooks", &self.bound_hooks)
            .finish()
    }
}

/// Summary of a loaded plugin for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedPluginInfo {
    /// Plugin slug.
    pub slug: String,
    /// Name reported by the instance.
    pub name: String,
    /// Version reported by the instance.
    pub version: String,
    /// Description reported by the instance.
    pub description: String,
    /// Number of bound hooks.
    pub bound_hooks: usize,
}

/// Registry of loaded plugins keyed by slug.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: RwLock<BTreeMap<String, Arc<LoadedPlugin>>>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a loaded plugin. Returns `false` when the slug is already present.
    pub async fn insert(&self, plugin: LoadedPlugin) -> bool {
        let mut plugins = self.plugins.write().await;
        if plugins.contains_key(&plugin.slug) {
            return false;
        }
        info!(
            plugin = %plugin.slug,
            name = %plugin.instance.name(),
            version = %plugin.instance.version(),
            "Plugin instance registered"
        );
        plugins.insert(plugin.slug.clone(), Arc::new(plugin));
        true
    }

    /// Removes a plugin by slug.
    pub async fn remove(&self, slug: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins.write().await.remove(slug)
    }

    /// Gets a plugin by slug.
    pub async fn get(&self, slug: &str) -> Option<Arc<LoadedPlugin>> {
        self.plugins.read().await.get(slug).cloned()
    }

    /// Checks whether a plugin is loaded.
    pub async fn contains(&self, slug: &str) -> bool {
        self.plugins.read().await.contains_key(slug)
    }

    /// Slugs of all loaded plugins, sorted.
    pub async fn slugs(&self) -> Vec<String> {
        self.plugins.read().await.keys().cloned().collect()
    }

    /// All loaded plugins, sorted by slug.
    pub async fn all(&self) -> Vec<Arc<LoadedPlugin>> {
        self.plugins.read().await.values().cloned().collect()
    }

    /// Listing view of all loaded plugins.
    pub async fn list(&self) -> Vec<LoadedPluginInfo> {
        self.all()
            .await
            .iter()
            .map(|p| LoadedPluginInfo {
                slug: p.slug.clone(),
                name: p.instance.name().to_string(),
                version: p.instance.version().to_string(),
                description: p.instance.description().to_string(),
                bound_hooks: p.bound_hooks,
            })
            .collect()
    }

    /// Returns plugin count.
    pub async fn count(&self) -> usize {
        self.plugins.read().await.len()
    }
}
