//! Live, copy-on-write plugin configuration.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Shared handle to a loaded plugin's current configuration.
///
/// Readers take an immutable snapshot; [`LiveConfig::replace`] swaps in a
/// new value without touching snapshots already handed out, so a hook
/// invocation sees one consistent configuration from start to finish.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    current: Arc<RwLock<Arc<Value>>>,
}

impl LiveConfig {
    /// Create a handle holding `initial`.
    pub fn new(initial: Value) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// The current configuration.
    pub async fn snapshot(&self) -> Arc<Value> {
        self.current.read().await.clone()
    }

    /// Replace the configuration for all subsequent snapshots.
    pub async fn replace(&self, value: Value) {
        *self.current.write().await = Arc::new(value);
    }
}
