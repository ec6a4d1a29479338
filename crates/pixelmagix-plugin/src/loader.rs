//! Plugin catalog: resolves entry-point strings to concrete extensions.
//!
//! Plugins are compiled in. Each implementation is registered under an
//! entry-point key (e.g. `builtin::seo`) together with a factory; loading
//! a persisted record looks its `entry_point` up here.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::debug;

use crate::builtin;
use crate::contract::Extension;
use crate::error::{ExtensionError, PluginError};
use crate::hooks::dispatcher::panic_message;

/// Creates a fresh extension instance.
pub type ExtensionFactory =
    Arc<dyn Fn() -> Result<Arc<dyn Extension>, ExtensionError> + Send + Sync>;

/// Lookup table from entry point to factory.
#[derive(Clone, Default)]
pub struct PluginCatalog {
    factories: BTreeMap<String, ExtensionFactory>,
}

impl std::fmt::Debug for PluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCatalog")
            .field("entry_points", &self.entry_points())
            .finish()
    }
}

impl PluginCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the built-in plugins.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        builtin::register_all(&mut catalog);
        catalog
    }

    /// Registers a factory, replacing any previous one for the entry point.
    pub fn register<F>(&mut self, entry_point: &str, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Extension>, ExtensionError> + Send + Sync + 'static,
    {
        debug!(entry_point = %entry_point, "Plugin factory registered");
        self.factories
            .insert(entry_point.to_string(), Arc::new(factory));
    }

    /// Registers a type that can be built with `Default`.
    pub fn register_default<E>(&mut self, entry_point: &str)
    where
        E: Extension + Default,
    {
        self.register(entry_point, || Ok(Arc::new(E::default()) as Arc<dyn Extension>));
    }

    /// Whether an entry point is known.
    pub fn contains(&self, entry_point: &str) -> bool {
        self.factories.contains_key(entry_point)
    }

    /// All registered entry points, sorted.
    pub fn entry_points(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Resolves and instantiates the extension for a plugin.
    ///
    /// Unknown entry points, factory errors and factory panics all surface
    /// as [`PluginError::LoadFailure`].
    pub fn instantiate(
        &self,
        slug: &str,
        entry_point: &str,
    ) -> Result<Arc<dyn Extension>, PluginError> {
        let factory = self
            .factories
            .get(entry_point)
            .ok_or_else(|| PluginError::LoadFailure {
                plugin: slug.to_string(),
                reason: format!("unknown entry point '{entry_point}'"),
            })?;

        match panic::catch_unwind(AssertUnwindSafe(|| factory())) {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(err)) => Err(PluginError::LoadFailure {
                plugin: slug.to_string(),
                reason: format!("instantiation failed: {err}"),
            }),
            Err(payload) => Err(PluginError::LoadFailure {
                plugin: slug.to_string(),
                reason: format!("instantiation panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let catalog = PluginCatalog::with_builtins();
        assert!(catalog.contains(builtin::SEO_ENTRY_POINT));
        assert!(catalog.contains(builtin::CONTACT_FORM_ENTRY_POINT));
        assert!(catalog.contains(builtin::SECURITY_ENTRY_POINT));
        assert!(catalog.contains(builtin::EXPORT_ENTRY_POINT));

        let seo = catalog
            .instantiate("seo", builtin::SEO_ENTRY_POINT)
            .unwrap();
        assert_eq!(seo.name(), "SEO");
    }

    #[test]
    fn test_unknown_entry_point_is_load_failure() {
        let catalog = PluginCatalog::new();
        let err = catalog.instantiate("x", "nowhere::plugin").err().unwrap();
        assert!(matches!(err, PluginError::LoadFailure { .. }));
        assert!(err.to_string().contains("nowhere::plugin"));
    }

    #[test]
    fn test_failing_and_panicking_factories_are_load_failures() {
        let mut catalog = PluginCatalog::new();
        catalog.register("err", || Err(ExtensionError::new("missing dependency")));
        catalog.register("panic", || panic!("constructor bug"));

        let err = catalog.instantiate("a", "err").err().unwrap();
        assert!(err.to_string().contains("missing dependency"));

        let err = catalog.instantiate("b", "panic").err().unwrap();
        assert!(err.to_string().contains("constructor bug"));
    }
}
