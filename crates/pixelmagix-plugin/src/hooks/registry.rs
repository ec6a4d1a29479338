//! Hook registry: plugins register callbacks by event name with priority ordering.
//!
//! Each event maps to an immutable, shared handler list. Registration and
//! unregistration build a new list and swap it in under the write lock, so
//! a dispatch holding a snapshot keeps iterating the list it started with.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::LiveConfig;
use crate::contract::HookFn;

/// A registered callback.
pub struct HookEntry {
    /// Slug of the owning plugin.
    pub plugin: String,
    /// Declared handler name, kept for logs and introspection.
    pub handler: String,
    /// Lower runs first.
    pub priority: i32,
    /// The bound callback.
    pub callback: HookFn,
    /// The owning plugin's live configuration.
    pub config: LiveConfig,
}

impl std::fmt::Debug for HookEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookEntry")
            .field("plugin", &self.plugin)
            .field("handler", &self.handler)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Introspection view of one registered callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookBinding {
    /// Owning plugin slug.
    pub plugin: String,
    /// Handler name.
    pub handler: String,
    /// Priority.
    pub priority: i32,
}

/// Shared, immutable handler list for one event.
pub type HandlerList = Arc<Vec<Arc<HookEntry>>>;

#[derive(Debug, Default)]
struct Tables {
    /// Event name → handlers in dispatch order.
    events: HashMap<String, HandlerList>,
    /// Plugin slug → events it has handlers on.
    owners: HashMap<String, BTreeSet<String>>,
}

/// Registry of hook callbacks organized by event name.
#[derive(Debug, Default)]
pub struct HookRegistry {
    tables: RwLock<Tables>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for an event.
    ///
    /// The list is re-sorted by ascending priority with a stable sort, so
    /// equal priorities keep registration order.
    pub async fn register(&self, event: &str, entry: HookEntry) {
        let plugin = entry.plugin.clone();
        let priority = entry.priority;
        let handler = entry.handler.clone();

        let mut tables = self.tables.write().await;

        let mut list: Vec<Arc<HookEntry>> = tables
            .events
            .get(event)
            .map(|current| current.to_vec())
            .unwrap_or_default();
        list.push(Arc::new(entry));
        list.sort_by_key(|e| e.priority);

        tables.events.insert(event.to_string(), Arc::new(list));
        tables
            .owners
            .entry(plugin.clone())
            .or_default()
            .insert(event.to_string());

        debug!(
            hook = %event,
            plugin = %plugin,
            handler = %handler,
            priority = priority,
            "Hook handler registered"
        );
    }

    /// Unregisters every callback owned by a plugin. Returns how many were removed.
    ///
    /// Only the events the plugin registered on are rebuilt.
    pub async fn unregister_plugin(&self, plugin: &str) -> usize {
        let mut tables = self.tables.write().await;

        let Some(events) = tables.owners.remove(plugin) else {
            return 0;
        };

        let mut removed = 0;
        for event in events {
            let Some(current) = tables.events.get(&event) else {
                continue;
            };
            let kept: Vec<Arc<HookEntry>> = current
                .iter()
                .filter(|e| e.plugin != plugin)
                .cloned()
                .collect();
            removed += current.len() - kept.len();

            if kept.is_empty() {
                tables.events.remove(&event);
            } else {
                tables.events.insert(event, Arc::new(kept));
            }
        }

        info!(plugin = %plugin, removed = removed, "All hooks unregistered for plugin");
        removed
    }

    /// The current handler list for an event, in dispatch order.
    pub async fn snapshot(&self, event: &str) -> HandlerList {
        let tables = self.tables.read().await;
        tables.events.get(event).cloned().unwrap_or_default()
    }

    /// Introspection view of an event's handlers, in dispatch order.
    pub async fn handlers(&self, event: &str) -> Vec<HookBinding> {
        self.snapshot(event)
            .await
            .iter()
            .map(|e| HookBinding {
                plugin: e.plugin.clone(),
                handler: e.handler.clone(),
                priority: e.priority,
            })
            .collect()
    }

    /// Returns the number of handlers registered for an event.
    pub async fn handler_count(&self, event: &str) -> usize {
        self.snapshot(event).await.len()
    }

    /// Whether any handler of the plugin is registered.
    pub async fn has_plugin(&self, plugin: &str) -> bool {
        self.tables.read().await.owners.contains_key(plugin)
    }

    /// Returns all event names with at least one handler, sorted.
    pub async fn registered_events(&self) -> Vec<String> {
        let tables = self.tables.read().await;
        let mut events: Vec<String> = tables.events.keys().cloned().collect();
        events.sort();
        events
    }
}
