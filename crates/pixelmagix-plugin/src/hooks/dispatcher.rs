//! Hook dispatcher: runs every callback registered for an event.
//!
//! Chained events fold the payload through the handlers in priority order.
//! Collected events hand each handler the same payload and gather the
//! outputs. In both modes a handler that returns an error or panics is
//! logged and skipped; dispatch itself never fails.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::contract::HookContext;
use crate::error::PluginError;

use super::definitions::DispatchMode;
use super::registry::{HookEntry, HookRegistry};

/// Result of [`HookDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutput {
    /// Final payload of a chained event.
    Chained(Value),
    /// Outputs of a collected event, in handler order.
    Collected(Vec<Value>),
}

/// Dispatches events to registered callbacks.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches an event in the mode its name is bound to.
    pub async fn dispatch(&self, event: &str, payload: Value, context: &Value) -> DispatchOutput {
        match DispatchMode::for_event(event) {
            DispatchMode::Chain => {
                DispatchOutput::Chained(self.dispatch_chain(event, payload, context).await)
            }
            DispatchMode::Collect => {
                DispatchOutput::Collected(self.dispatch_collect(event, &payload, context).await)
            }
        }
    }

    /// Folds `payload` through every handler of `event`.
    ///
    /// Handler *i* receives handler *i-1*'s output. An output whose JSON
    /// type differs from its input is discarded, as is the output of a
    /// failed handler; the chain continues with the last good value.
    pub async fn dispatch_chain(&self, event: &str, payload: Value, context: &Value) -> Value {
        let handlers = self.registry.snapshot(event).await;
        if handlers.is_empty() {
            return payload;
        }

        debug!(hook = %event, handler_count = handlers.len(), "Dispatching chained hook");

        let mut current = payload;
        for entry in handlers.iter() {
            match invoke(entry, event, context, current.clone()).await {
                Ok(next) if json_kind(&next) == json_kind(&current) => current = next,
                Ok(next) => {
                    warn!(
                        hook = %event,
                        plugin = %entry.plugin,
                        handler = %entry.handler,
                        expected = json_kind(&current),
                        returned = json_kind(&next),
                        "Hook handler returned a different payload type; output discarded"
                    );
                }
                Err(err) => log_failure(entry, event, &err),
            }
        }

        current
    }

    /// Calls every handler of `event` with the same `payload` and collects
    /// the outputs of those that succeed.
    pub async fn dispatch_collect(
        &self,
        event: &str,
        payload: &Value,
        context: &Value,
    ) -> Vec<Value> {
        let handlers = self.registry.snapshot(event).await;
        if handlers.is_empty() {
            return Vec::new();
        }

        debug!(hook = %event, handler_count = handlers.len(), "Dispatching collected hook");

        let mut results = Vec::with_capacity(handlers.len());
        for entry in handlers.iter() {
            match invoke(entry, event, context, payload.clone()).await {
                Ok(output) => results.push(output),
                Err(err) => log_failure(entry, event, &err),
            }
        }
        results
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

async fn invoke(
    entry: &HookEntry,
    event: &str,
    context: &Value,
    input: Value,
) -> Result<Value, PluginError> {
    let config = entry.config.snapshot().await;
    let ctx = HookContext {
        event,
        plugin: &entry.plugin,
        config: &config,
        context,
    };

    let reason = match panic::catch_unwind(AssertUnwindSafe(|| (entry.callback)(&ctx, input))) {
        Ok(Ok(output)) => return Ok(output),
        Ok(Err(err)) => err.to_string(),
        Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
    };

    Err(PluginError::HandlerExecution {
        event: event.to_string(),
        plugin: entry.plugin.clone(),
        handler: entry.handler.clone(),
        reason,
    })
}

fn log_failure(entry: &HookEntry, event: &str, err: &PluginError) {
    error!(
        hook = %event,
        plugin = %entry.plugin,
        handler = %entry.handler,
        error = %err,
        "Hook handler failed"
    );
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
