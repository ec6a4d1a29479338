//! Plugin manager: install, load, activate, deactivate, configure and
//! uninstall plugins against their persisted records.
//!
//! Every mutation of the loaded set or the hook tables happens under one
//! lifecycle lock. Dispatch does not take it; it reads copy-on-write
//! handler lists from the [`HookRegistry`].

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use pixelmagix_core::error::ErrorKind;
use pixelmagix_database::repositories::plugin::PluginRepository;
use pixelmagix_entity::plugin::{Plugin, PluginWithHooks};

use crate::config::LiveConfig;
use crate::error::{ExtensionError, PluginError};
use crate::hooks::definitions::HookPoint;
use crate::hooks::dispatcher::{DispatchOutput, HookDispatcher, panic_message};
use crate::hooks::registry::{HookBinding, HookEntry, HookRegistry};
use crate::loader::PluginCatalog;
use crate::manifest::PluginDescriptor;
use crate::package;
use crate::registry::{LoadedPlugin, LoadedPluginInfo, PluginRegistry};

/// Outcome of [`PluginManager::load_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Slugs loaded successfully.
    pub loaded: Vec<String>,
    /// Slugs that failed to load.
    pub failed: Vec<String>,
}

/// Owns the lifecycle of every plugin.
#[derive(Debug)]
pub struct PluginManager {
    /// Persisted plugin records.
    repo: PluginRepository,
    /// Entry point → implementation.
    catalog: PluginCatalog,
    /// Loaded instances.
    loaded: PluginRegistry,
    /// Hook registry.
    hooks: Arc<HookRegistry>,
    /// Hook dispatcher.
    dispatcher: HookDispatcher,
    /// Serializes lifecycle operations.
    lifecycle: Mutex<()>,
    /// Where packaged plugins are unpacked.
    plugins_dir: PathBuf,
}

impl PluginManager {
    /// Creates a manager with nothing loaded.
    pub fn new(pool: SqlitePool, catalog: PluginCatalog, plugins_dir: impl Into<PathBuf>) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let dispatcher = HookDispatcher::new(hooks.clone());

        Self {
            repo: PluginRepository::new(pool),
            catalog,
            loaded: PluginRegistry::new(),
            hooks,
            dispatcher,
            lifecycle: Mutex::new(()),
            plugins_dir: plugins_dir.into(),
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    /// Persists a new plugin and its hook rows. Does not load it.
    ///
    /// The entry point must name a catalog entry.
    pub async fn install(
        &self,
        descriptor: PluginDescriptor,
    ) -> Result<PluginWithHooks, PluginError> {
        descriptor.check()?;
        if !self.catalog.contains(&descriptor.entry_point) {
            return Err(PluginError::InvalidManifest(format!(
                "unknown entry point '{}'",
                descriptor.entry_point
            )));
        }
        let _guard = self.lifecycle.lock().await;

        if self.repo.find_by_slug(&descriptor.slug).await?.is_some() {
            return Err(PluginError::DuplicateSlug(descriptor.slug));
        }

        let created = self
            .repo
            .create_with_hooks(&descriptor.to_create())
            .await
            .map_err(|e| match e.kind {
                ErrorKind::Conflict => PluginError::DuplicateSlug(descriptor.slug.clone()),
                _ => PluginError::Storage(e),
            })?;

        info!(
            plugin = %created.plugin.slug,
            version = %created.plugin.version,
            entry_point = %created.plugin.entry_point,
            hooks = created.hooks.len(),
            "Plugin installed"
        );
        Ok(created)
    }

    /// Installs a zipped plugin package.
    ///
    /// The package directory is removed again when the install fails.
    pub async fn install_archive(&self, bytes: Vec<u8>) -> Result<PluginWithHooks, PluginError> {
        let staged = package::stage(bytes, &self.plugins_dir).await?;
        let slug = staged.descriptor.slug.clone();

        match self.install(staged.descriptor).await {
            Ok(created) => Ok(created),
            Err(err) => {
                if let Err(cleanup) = package::remove(&self.plugins_dir, &slug).await {
                    warn!(plugin = %slug, error = %cleanup, "Failed to remove staged package");
                }
                Err(err)
            }
        }
    }

    /// Loads every active plugin. One plugin failing never stops the others.
    pub async fn load_all(&self) -> Result<LoadSummary, PluginError> {
        let plugins = self.repo.find_active().await?;
        let _guard = self.lifecycle.lock().await;

        let mut summary = LoadSummary::default();
        for plugin in &plugins {
            match self.load_locked(plugin).await {
                Ok(()) => summary.loaded.push(plugin.slug.clone()),
                Err(err) => {
                    error!(plugin = %plugin.slug, error = %err, "Plugin failed to load");
                    summary.failed.push(plugin.slug.clone());
                }
            }
        }

        info!(
            loaded = summary.loaded.len(),
            failed = summary.failed.len(),
            "Active plugins loaded"
        );
        Ok(summary)
    }

    /// Loads one plugin. Returns whether it is loaded afterwards.
    pub async fn load(&self, plugin: &Plugin) -> bool {
        let _guard = self.lifecycle.lock().await;
        match self.load_locked(plugin).await {
            Ok(()) => true,
            Err(err) => {
                error!(plugin = %plugin.slug, error = %err, "Plugin failed to load");
                false
            }
        }
    }

    /// Removes a plugin entirely: unloads it, deletes its record and hook
    /// rows, and removes its package directory.
    pub async fn uninstall(&self, slug: &str) -> Result<(), PluginError> {
        let _guard = self.lifecycle.lock().await;

        if self.repo.find_by_slug(slug).await?.is_none() {
            return Err(PluginError::NotFound(slug.to_string()));
        }

        self.teardown_locked(slug).await;
        self.repo.delete(slug).await?;

        if let Err(err) = package::remove(&self.plugins_dir, slug).await {
            warn!(plugin = %slug, error = %err, "Failed to remove plugin directory");
        }

        info!(plugin = %slug, "Plugin uninstalled");
        Ok(())
    }

    /// Sets the active flag and loads the plugin.
    ///
    /// When loading fails the flag is reverted and the load error returned.
    pub async fn activate(&self, slug: &str) -> Result<Plugin, PluginError> {
        let _guard = self.lifecycle.lock().await;

        let plugin = self
            .repo
            .set_active(slug, true)
            .await?
            .ok_or_else(|| PluginError::NotFound(slug.to_string()))?;

        if let Err(err) = self.load_locked(&plugin).await {
            error!(plugin = %slug, error = %err, "Plugin failed to load on activation");
            if let Err(revert) = self.repo.set_active(slug, false).await {
                error!(plugin = %slug, error = %revert, "Failed to clear active flag");
            }
            return Err(err);
        }

        info!(plugin = %slug, "Plugin activated");
        Ok(plugin)
    }

    /// Clears the active flag and unloads the plugin, keeping its record.
    pub async fn deactivate(&self, slug: &str) -> Result<Plugin, PluginError> {
        let _guard = self.lifecycle.lock().await;

        let plugin = self
            .repo
            .set_active(slug, false)
            .await?
            .ok_or_else(|| PluginError::NotFound(slug.to_string()))?;

        self.teardown_locked(slug).await;

        info!(plugin = %slug, "Plugin deactivated");
        Ok(plugin)
    }

    /// Persists a new configuration and swaps it into the loaded instance.
    ///
    /// The next hook invocation of the plugin sees the new value; the
    /// instance is not reloaded.
    pub async fn update_config(&self, slug: &str, config: Value) -> Result<Plugin, PluginError> {
        if !config.is_object() {
            return Err(PluginError::InvalidConfig(
                "configuration must be a JSON object".to_string(),
            ));
        }
        let _guard = self.lifecycle.lock().await;

        let plugin = self
            .repo
            .update_config(slug, &config)
            .await?
            .ok_or_else(|| PluginError::NotFound(slug.to_string()))?;

        if let Some(loaded) = self.loaded.get(slug).await {
            loaded.config.replace(config).await;
            debug!(plugin = %slug, "Live configuration replaced");
        }

        info!(plugin = %slug, "Plugin configuration updated");
        Ok(plugin)
    }

    /// Unloads every plugin without touching persisted state.
    pub async fn shutdown(&self) {
        let _guard = self.lifecycle.lock().await;
        for slug in self.loaded.slugs().await {
            self.teardown_locked(&slug).await;
        }
        info!("All plugins unloaded");
    }

    async fn load_locked(&self, plugin: &Plugin) -> Result<(), PluginError> {
        if self.loaded.contains(&plugin.slug).await {
            debug!(plugin = %plugin.slug, "Plugin already loaded");
            return Ok(());
        }

        let instance = self.catalog.instantiate(&plugin.slug, &plugin.entry_point)?;
        let rows = self.repo.hooks_for(plugin.id).await?;

        let mut bindings = Vec::with_capacity(rows.len());
        for row in rows {
            match instance.clone().handler(&row.handler) {
                Some(callback) => bindings.push((row, callback)),
                None => {
                    let err = PluginError::HandlerNotFound {
                        plugin: plugin.slug.clone(),
                        event: row.hook_name.clone(),
                        handler: row.handler.clone(),
                    };
                    warn!(
                        plugin = %plugin.slug,
                        hook = %row.hook_name,
                        handler = %row.handler,
                        error = %err,
                        "Skipping hook"
                    );
                }
            }
        }

        guarded(&plugin.slug, "on_init", || instance.on_init(&plugin.config)).map_err(
            |reason| PluginError::LoadFailure {
                plugin: plugin.slug.clone(),
                reason: format!("initialization failed: {reason}"),
            },
        )?;

        let config = LiveConfig::new(plugin.config.clone());
        let bound_hooks = bindings.len();
        for (row, callback) in bindings {
            self.hooks
                .register(
                    &row.hook_name,
                    HookEntry {
                        plugin: plugin.slug.clone(),
                        handler: row.handler,
                        priority: row.priority,
                        callback,
                        config: config.clone(),
                    },
                )
                .await;
        }

        self.loaded
            .insert(LoadedPlugin {
                slug: plugin.slug.clone(),
                entry_point: plugin.entry_point.clone(),
                instance,
                config,
                bound_hooks,
            })
            .await;

        info!(plugin = %plugin.slug, hooks = bound_hooks, "Plugin loaded");
        Ok(())
    }

    /// Runs the plugin's cleanup, drops its hooks and forgets the instance.
    /// Returns whether the plugin was loaded.
    async fn teardown_locked(&self, slug: &str) -> bool {
        let Some(plugin) = self.loaded.get(slug).await else {
            return false;
        };

        if let Err(reason) = guarded(slug, "cleanup", || plugin.instance.cleanup()) {
            warn!(plugin = %slug, error = %reason, "Plugin cleanup failed");
        }

        let removed = self.hooks.unregister_plugin(slug).await;
        self.loaded.remove(slug).await;

        info!(plugin = %slug, hooks = removed, "Plugin unloaded");
        true
    }

    // ── Queries ────────────────────────────────────────────────────

    /// A persisted plugin with its hook rows.
    pub async fn get(&self, slug: &str) -> Result<PluginWithHooks, PluginError> {
        self.repo
            .find_with_hooks(slug)
            .await?
            .ok_or_else(|| PluginError::NotFound(slug.to_string()))
    }

    /// Every persisted plugin with its hook rows.
    pub async fn list(&self) -> Result<Vec<PluginWithHooks>, PluginError> {
        let plugins = self.repo.find_all().await?;
        let mut out = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            let hooks = self.repo.hooks_for(plugin.id).await?;
            out.push(PluginWithHooks { plugin, hooks });
        }
        Ok(out)
    }

    /// Whether a plugin instance is loaded.
    pub async fn is_loaded(&self, slug: &str) -> bool {
        self.loaded.contains(slug).await
    }

    /// Loaded plugin instances.
    pub async fn loaded_plugins(&self) -> Vec<LoadedPluginInfo> {
        self.loaded.list().await
    }

    /// Registered handlers of an event, in dispatch order.
    pub async fn hooks_for(&self, event: &str) -> Vec<HookBinding> {
        self.hooks.handlers(event).await
    }

    /// UI components of every loaded plugin, keyed by plugin slug.
    pub async fn frontend_components(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for plugin in self.loaded.all().await {
            match guarded(&plugin.slug, "frontend_components", || {
                Ok::<_, ExtensionError>(plugin.instance.frontend_components())
            }) {
                Ok(components) if !components.is_empty() => {
                    out.insert(plugin.slug.clone(), Value::Object(components));
                }
                Ok(_) => {}
                Err(reason) => {
                    warn!(plugin = %plugin.slug, error = %reason, "Failed to read frontend components");
                }
            }
        }
        out
    }

    /// Editor blocks of every loaded plugin.
    pub async fn editor_blocks(&self) -> Vec<Value> {
        let mut out = Vec::new();
        for plugin in self.loaded.all().await {
            match guarded(&plugin.slug, "editor_blocks", || {
                Ok::<_, ExtensionError>(plugin.instance.editor_blocks())
            }) {
                Ok(blocks) => out.extend(blocks),
                Err(reason) => {
                    warn!(plugin = %plugin.slug, error = %reason, "Failed to read editor blocks");
                }
            }
        }
        out
    }

    /// Directory packaged plugins are unpacked into.
    pub fn plugins_dir(&self) -> &Path {
        &self.plugins_dir
    }

    /// The hook dispatcher.
    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }

    // ── Dispatch ───────────────────────────────────────────────────

    /// Dispatches an event in the mode its name is bound to.
    pub async fn dispatch(&self, event: &str, payload: Value, context: &Value) -> DispatchOutput {
        self.dispatcher.dispatch(event, payload, context).await
    }

    /// Runs the page-save hooks over an incoming page mapping.
    pub async fn process_page_save(&self, page: Value) -> Value {
        let mut page = page;
        for point in [HookPoint::BeforePageSave, HookPoint::OnPageSave] {
            page = self
                .dispatcher
                .dispatch_chain(point.as_str(), page, &Value::Null)
                .await;
        }
        page
    }

    /// Runs the render hooks over rendered markup. `page` is handed to the
    /// handlers as context.
    pub async fn process_page_render(&self, html: String, page: &Value) -> String {
        let mut markup = Value::String(html);
        for point in [HookPoint::AfterPageRender, HookPoint::OnPageExport] {
            markup = self
                .dispatcher
                .dispatch_chain(point.as_str(), markup, page)
                .await;
        }
        match markup {
            Value::String(html) => html,
            other => other.to_string(),
        }
    }

    /// Fires a collected notification and returns the handlers' outputs.
    pub async fn notify(&self, event: &str, payload: &Value) -> Vec<Value> {
        self.dispatcher
            .dispatch_collect(event, payload, &Value::Null)
            .await
    }
}

/// Runs plugin code, turning errors and panics into a message.
fn guarded<T, E, F>(slug: &str, what: &str, f: F) -> Result<T, String>
where
    E: std::fmt::Display,
    F: FnOnce() -> Result<T, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(plugin = %slug, call = %what, panic = %message, "Plugin code panicked");
            Err(format!("panicked: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{Extension, HookFn, hook_fn, standard_handler};
    use crate::manifest::HookDescriptor;
    use crate::{builtin, package};
    use pixelmagix_core::config::DatabaseConfig;
    use pixelmagix_database::DatabasePool;
    use pixelmagix_database::migration::run_migrations;
    use serde_json::json;
    use tempfile::TempDir;

    /// Appends `config.suffix` to string payloads; refuses to start when
    /// `config.fail_init` is set.
    #[derive(Default)]
    struct Suffix;

    impl Extension for Suffix {
        fn name(&self) -> &str {
            "Suffix"
        }
        fn version(&self) -> &str {
            "0.1.0"
        }
        fn description(&self) -> &str {
            "Appends the configured suffix"
        }
        fn on_init(&self, config: &Value) -> Result<(), ExtensionError> {
            if config.get("fail_init").and_then(Value::as_bool) == Some(true) {
                return Err(ExtensionError::new("refusing to start"));
            }
            Ok(())
        }
        fn handler(self: Arc<Self>, name: &str) -> Option<HookFn> {
            match name {
                "suffix" => Some(hook_fn(|ctx, payload| {
                    let base = payload.as_str().unwrap_or_default();
                    let suffix = ctx.config["suffix"].as_str().unwrap_or_default();
                    Ok(Value::String(format!("{base}{suffix}")))
                })),
                _ => standard_handler(self, name),
            }
        }
    }

    async fn manager() -> (PluginManager, TempDir) {
        let (manager, _pool, dir) = manager_with_pool().await;
        (manager, dir)
    }

    async fn manager_with_pool() -> (PluginManager, SqlitePool, TempDir) {
        let db = DatabasePool::connect(&DatabaseConfig::in_memory())
            .await
            .unwrap();
        run_migrations(db.pool()).await.unwrap();
        let pool = db.into_pool();

        let mut catalog = PluginCatalog::with_builtins();
        catalog.register_default::<Suffix>("test::suffix");

        let dir = tempfile::tempdir().unwrap();
        let manager = PluginManager::new(pool.clone(), catalog, dir.path().join("plugins"));
        (manager, pool, dir)
    }

    fn descriptor(slug: &str, entry_point: &str, hooks: &[(&str, &str, i32)]) -> PluginDescriptor {
        PluginDescriptor {
            slug: slug.to_string(),
            name: slug.to_uppercase(),
            version: "1.0.0".to_string(),
            entry_point: entry_point.to_string(),
            description: String::new(),
            author: String::new(),
            is_active: true,
            config: json!({}),
            hooks: hooks
                .iter()
                .map(|(hook_name, handler, priority)| HookDescriptor {
                    hook_name: hook_name.to_string(),
                    handler: handler.to_string(),
                    priority: *priority,
                })
                .collect(),
        }
    }

    fn seo() -> PluginDescriptor {
        descriptor(
            "seo",
            builtin::SEO_ENTRY_POINT,
            &[("before_page_save", "before_page_save", 10)],
        )
    }

    #[tokio::test]
    async fn test_seo_title_injected_on_page_save() {
        let (manager, _dir) = manager().await;
        manager.install(seo()).await.unwrap();
        assert!(!manager.is_loaded("seo").await);

        let summary = manager.load_all().await.unwrap();
        assert_eq!(summary.loaded, vec!["seo".to_string()]);

        let page = manager.process_page_save(json!({"title": "Foo"})).await;
        assert_eq!(page, json!({"title": "Foo", "metadata": {"seo": {"title": "Foo"}}}));
    }

    #[tokio::test]
    async fn test_duplicate_install_leaves_first_record() {
        let (manager, _dir) = manager().await;
        manager.install(seo()).await.unwrap();

        let mut second = seo();
        second.name = "Impostor".to_string();
        let err = manager.install(second).await.unwrap_err();
        assert!(matches!(err, PluginError::DuplicateSlug(ref s) if s == "seo"));

        let stored = manager.get("seo").await.unwrap();
        assert_eq!(stored.plugin.name, "SEO");
        assert_eq!(stored.hooks.len(), 1);
    }

    #[tokio::test]
    async fn test_uninstall_removes_hooks_and_record() {
        let (manager, _dir) = manager().await;
        manager.install(seo()).await.unwrap();
        manager.load_all().await.unwrap();
        assert_eq!(manager.hooks_for("before_page_save").await.len(), 1);

        manager.uninstall("seo").await.unwrap();

        assert!(manager.hooks_for("before_page_save").await.is_empty());
        assert!(!manager.is_loaded("seo").await);
        assert!(matches!(manager.get("seo").await, Err(PluginError::NotFound(_))));
        assert!(matches!(
            manager.uninstall("seo").await,
            Err(PluginError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_handler_is_skipped() {
        let (manager, _dir) = manager().await;
        manager
            .install(descriptor(
                "seo",
                builtin::SEO_ENTRY_POINT,
                &[
                    ("before_page_save", "no_such_method", 1),
                    ("before_page_save", "before_page_save", 10),
                ],
            ))
            .await
            .unwrap();

        let summary = manager.load_all().await.unwrap();
        assert_eq!(summary.loaded, vec!["seo".to_string()]);

        let bound = manager.hooks_for("before_page_save").await;
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].handler, "before_page_save");
    }

    #[tokio::test]
    async fn test_one_failing_plugin_does_not_block_others() {
        let (manager, _dir) = manager().await;
        let mut broken = descriptor("broken", "test::suffix", &[]);
        broken.config = json!({"fail_init": true});
        manager.install(broken).await.unwrap();
        manager.install(seo()).await.unwrap();

        let summary = manager.load_all().await.unwrap();
        assert_eq!(summary.loaded, vec!["seo".to_string()]);
        assert_eq!(summary.failed, vec!["broken".to_string()]);
        assert!(manager.is_loaded("seo").await);
    }

    #[tokio::test]
    async fn test_config_update_visible_to_next_invocation() {
        let (manager, _dir) = manager().await;
        let mut plugin = descriptor("suffix", "test::suffix", &[("before_page_save", "suffix", 10)]);
        plugin.config = json!({"suffix": "-a"});
        manager.install(plugin).await.unwrap();
        manager.load_all().await.unwrap();

        assert_eq!(manager.process_page_save(json!("x")).await, json!("x-a"));

        manager
            .update_config("suffix", json!({"suffix": "-b"}))
            .await
            .unwrap();
        assert_eq!(manager.process_page_save(json!("x")).await, json!("x-b"));
        assert_eq!(
            manager.get("suffix").await.unwrap().plugin.config,
            json!({"suffix": "-b"})
        );

        assert!(matches!(
            manager.update_config("suffix", json!([1])).await,
            Err(PluginError::InvalidConfig(_))
        ));
        assert!(matches!(
            manager.update_config("missing", json!({})).await,
            Err(PluginError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_activate_and_deactivate() {
        let (manager, _dir) = manager().await;
        let mut plugin = seo();
        plugin.is_active = false;
        manager.install(plugin).await.unwrap();

        assert!(manager.load_all().await.unwrap().loaded.is_empty());

        let activated = manager.activate("seo").await.unwrap();
        assert!(activated.is_active);
        assert!(manager.is_loaded("seo").await);

        let deactivated = manager.deactivate("seo").await.unwrap();
        assert!(!deactivated.is_active);
        assert!(!manager.is_loaded("seo").await);
        assert!(manager.hooks_for("before_page_save").await.is_empty());
        assert!(manager.get("seo").await.is_ok());

        assert!(matches!(
            manager.activate("missing").await,
            Err(PluginError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_activation_reverts_flag() {
        let (manager, _dir) = manager().await;
        let mut plugin = descriptor("suffix", "test::suffix", &[("before_page_save", "suffix", 10)]);
        plugin.is_active = false;
        plugin.config = json!({"fail_init": true});
        manager.install(plugin).await.unwrap();

        let err = manager.activate("suffix").await.unwrap_err();
        assert!(matches!(err, PluginError::LoadFailure { .. }));
        assert!(!manager.get("suffix").await.unwrap().plugin.is_active);
        assert!(manager.hooks_for("before_page_save").await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_revert_still_returns_load_error() {
        let (manager, pool, _dir) = manager_with_pool().await;
        let mut plugin = descriptor("suffix", "test::suffix", &[("before_page_save", "suffix", 10)]);
        plugin.is_active = false;
        plugin.config = json!({"fail_init": true});
        manager.install(plugin).await.unwrap();
        sqlx::query(
            "CREATE TRIGGER pin_active BEFORE UPDATE OF is_active ON plugins \
             WHEN NEW.is_active = 0 BEGIN SELECT RAISE(ABORT, 'pinned'); END",
        )
        .execute(&pool)
        .await
        .unwrap();

        let err = manager.activate("suffix").await.unwrap_err();
        assert!(matches!(err, PluginError::LoadFailure { .. }));
        assert!(!manager.is_loaded("suffix").await);
    }

    #[tokio::test]
    async fn test_install_rejects_unknown_entry_point() {
        let (manager, _dir) = manager().await;
        let err = manager
            .install(descriptor("ghost", "nowhere::plugin", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidManifest(ref m) if m.contains("nowhere::plugin")));
        assert!(matches!(manager.get("ghost").await, Err(PluginError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_render_runs_builtin_chain() {
        let (manager, _dir) = manager().await;
        manager
            .install(descriptor(
                "security",
                builtin::SECURITY_ENTRY_POINT,
                &[("after_page_render", "after_page_render", 10)],
            ))
            .await
            .unwrap();
        manager
            .install(descriptor(
                "contact-form",
                builtin::CONTACT_FORM_ENTRY_POINT,
                &[("after_page_render", "after_page_render", 5)],
            ))
            .await
            .unwrap();
        manager.load_all().await.unwrap();

        let page = json!({"metadata": {"contact_form": {"enabled": true}}});
        let html = "<html><head></head><body><script>x()</script></body></html>".to_string();
        let out = manager.process_page_render(html, &page).await;

        assert!(!out.contains("<script>"));
        assert!(out.contains("X-CSRF-Token"));
        assert!(out.contains("contact-form-container"));
        assert_eq!(manager.editor_blocks().await.len(), 1);
        assert!(manager.frontend_components().await.contains_key("contact-form"));
    }

    #[tokio::test]
    async fn test_install_archive_and_uninstall_cleans_directory() {
        let (manager, _dir) = manager().await;
        let bytes = package::test_support::archive(&[(
            "seo/plugin.json",
            r#"{"slug": "seo", "name": "SEO", "version": "1.0.0",
                "entry_point": "builtin::seo",
                "hooks": [{"hook_name": "before_page_save", "handler": "before_page_save"}]}"#,
        )]);

        let installed = manager.install_archive(bytes).await.unwrap();
        assert_eq!(installed.plugin.slug, "seo");
        assert_eq!(installed.hooks[0].priority, 10);
        assert!(manager.plugins_dir().join("seo/plugin.json").is_file());

        manager.uninstall("seo").await.unwrap();
        assert!(!manager.plugins_dir().join("seo").exists());
    }

    #[tokio::test]
    async fn test_shutdown_unloads_everything() {
        let (manager, _dir) = manager().await;
        manager.install(seo()).await.unwrap();
        manager.load_all().await.unwrap();

        manager.shutdown().await;

        assert!(manager.loaded_plugins().await.is_empty());
        assert!(manager.hooks_for("before_page_save").await.is_empty());
        assert!(manager.get("seo").await.unwrap().plugin.is_active);
    }
}
