//! The capability surface every plugin implements.
//!
//! Only the identity accessors are required. Every other capability has a
//! no-op default, so a plugin implements just the subset it needs and the
//! manager never has to check for optional methods.
//!
//! Hook bindings are resolved once, at load time, through
//! [`Extension::handler`]: a declared handler name becomes a [`HookFn`]
//! closure holding the instance. Dispatch never looks names up again.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::ExtensionError;

/// A bound hook callback.
///
/// Receives the invocation context and the current payload and returns the
/// transformed payload (chained dispatch) or an observation (collected
/// dispatch).
pub type HookFn =
    Arc<dyn Fn(&HookContext<'_>, Value) -> Result<Value, ExtensionError> + Send + Sync>;

/// Per-invocation data handed to a hook callback.
#[derive(Debug, Clone, Copy)]
pub struct HookContext<'a> {
    /// Event being dispatched.
    pub event: &'a str,
    /// Slug of the plugin owning the callback.
    pub plugin: &'a str,
    /// Configuration snapshot, fixed for the duration of this invocation.
    pub config: &'a Value,
    /// Side-channel data, such as the page being rendered.
    pub context: &'a Value,
}

/// The contract every plugin variant satisfies.
pub trait Extension: Send + Sync + 'static {
    /// Display name.
    fn name(&self) -> &str;

    /// Version string.
    fn version(&self) -> &str;

    /// Short description.
    fn description(&self) -> &str;

    /// UI component descriptors keyed by component name.
    fn frontend_components(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Editor block descriptors.
    fn editor_blocks(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Called exactly once after load with the persisted configuration.
    fn on_init(&self, _config: &Value) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Page-save transform.
    fn on_page_save(&self, _ctx: &HookContext<'_>, page: Value) -> Result<Value, ExtensionError> {
        Ok(page)
    }

    /// Render/export transform. `page` is the page the markup was rendered from.
    fn on_page_export(
        &self,
        _ctx: &HookContext<'_>,
        html: String,
        _page: &Value,
    ) -> Result<String, ExtensionError> {
        Ok(html)
    }

    /// Called exactly once before unload.
    fn cleanup(&self) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Resolve a declared handler name to a callback bound to this instance.
    ///
    /// Override to expose additional handler names, falling back to
    /// [`standard_handler`] for the contract methods.
    fn handler(self: Arc<Self>, name: &str) -> Option<HookFn> {
        standard_handler(self, name)
    }
}

/// Bind one of the contract's transform methods by name.
///
/// `on_page_save` and `before_page_save` bind [`Extension::on_page_save`];
/// `on_page_export` and `after_page_render` bind [`Extension::on_page_export`],
/// which expects a JSON string payload and reads the page from
/// [`HookContext::context`].
pub fn standard_handler<E>(ext: Arc<E>, name: &str) -> Option<HookFn>
where
    E: Extension + ?Sized,
{
    match name {
        "on_page_save" | "before_page_save" => Some(hook_fn(move |ctx, payload| {
            ext.on_page_save(ctx, payload)
        })),
        "on_page_export" | "after_page_render" => Some(hook_fn(move |ctx, payload| {
            let Value::String(html) = payload else {
                return Err(ExtensionError::new("expected rendered markup as a string"));
            };
            ext.on_page_export(ctx, html, ctx.context).map(Value::String)
        })),
        _ => None,
    }
}

/// Wrap a plain closure as a [`HookFn`].
pub fn hook_fn<F>(f: F) -> HookFn
where
    F: Fn(&HookContext<'_>, Value) -> Result<Value, ExtensionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Extension for Upper {
        fn name(&self) -> &str {
            "Upper"
        }
        fn version(&self) -> &str {
            "1.0.0"
        }
        fn description(&self) -> &str {
            "Uppercases markup"
        }
        fn on_page_export(
            &self,
            _ctx: &HookContext<'_>,
            html: String,
            page: &Value,
        ) -> Result<String, ExtensionError> {
            Ok(format!("{}:{}", html.to_uppercase(), page["slug"].as_str().unwrap_or("")))
        }
    }

    fn ctx<'a>(config: &'a Value, context: &'a Value) -> HookContext<'a> {
        HookContext {
            event: "after_page_render",
            plugin: "upper",
            config,
            context,
        }
    }

    #[test]
    fn test_standard_names_resolve() {
        let ext: Arc<dyn Extension> = Arc::new(Upper);
        assert!(ext.clone().handler("before_page_save").is_some());
        assert!(ext.clone().handler("on_page_export").is_some());
        assert!(ext.handler("missing_method").is_none());
    }

    #[test]
    fn test_default_page_save_is_identity() {
        let ext: Arc<dyn Extension> = Arc::new(Upper);
        let handler = ext.handler("on_page_save").unwrap();
        let config = Value::Null;
        let context = Value::Null;
        let page = serde_json::json!({"title": "Foo"});
        assert_eq!(handler(&ctx(&config, &context), page.clone()).unwrap(), page);
    }

    #[test]
    fn test_export_handler_reads_page_from_context() {
        let ext: Arc<dyn Extension> = Arc::new(Upper);
        let handler = ext.handler("after_page_render").unwrap();
        let config = Value::Null;
        let page = serde_json::json!({"slug": "home"});

        let out = handler(&ctx(&config, &page), Value::String("<p>".into())).unwrap();
        assert_eq!(out, Value::String("<P>:home".into()));

        let err = handler(&ctx(&config, &page), serde_json::json!({})).unwrap_err();
        assert!(err.0.contains("string"));
    }
}
