//! Plugin descriptors: the install request and the `plugin.json` package manifest.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use pixelmagix_entity::plugin::{CreatePlugin, CreatePluginHook};

use crate::error::PluginError;

/// Default hook priority.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Everything needed to install a plugin.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PluginDescriptor {
    /// Unique lookup key; also the install directory name for packages.
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: String,
    /// Display name.
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    /// Version string.
    #[validate(length(min = 1, max = 50))]
    pub version: String,
    /// Catalog key of the implementation.
    #[validate(length(min = 1, max = 255))]
    pub entry_point: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Author.
    #[serde(default)]
    pub author: String,
    /// Whether the plugin is active after install.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Initial configuration.
    #[serde(default = "empty_object")]
    #[validate(custom(function = "validate_object"))]
    pub config: serde_json::Value,
    /// Hooks the plugin subscribes to.
    #[serde(default)]
    #[validate(nested)]
    pub hooks: Vec<HookDescriptor>,
}

/// A hook subscription.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HookDescriptor {
    /// Event name.
    #[validate(length(min = 1, max = 100))]
    pub hook_name: String,
    /// Handler name on the plugin instance.
    #[validate(length(min = 1, max = 100))]
    pub handler: String,
    /// Lower runs first.
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl PluginDescriptor {
    /// Validates the descriptor, mapping failures to [`PluginError::InvalidManifest`].
    pub fn check(&self) -> Result<(), PluginError> {
        self.validate()
            .map_err(|e| PluginError::InvalidManifest(e.to_string()))
    }

    /// Parses and validates a `plugin.json` document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PluginError> {
        let descriptor: Self = serde_json::from_slice(bytes)
            .map_err(|e| PluginError::InvalidManifest(format!("plugin.json: {e}")))?;
        descriptor.check()?;
        Ok(descriptor)
    }

    /// Converts into the persistence model.
    pub fn to_create(&self) -> CreatePlugin {
        CreatePlugin {
            slug: self.slug.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            author: self.author.clone(),
            entry_point: self.entry_point.clone(),
            is_active: self.is_active,
            config: self.config.clone(),
            hooks: self
                .hooks
                .iter()
                .map(|h| CreatePluginHook {
                    hook_name: h.hook_name.clone(),
                    handler: h.handler.clone(),
                    priority: h.priority,
                })
                .collect(),
        }
    }
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let ok = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("slug may only contain a-z, 0-9, '-' and '_'".into()))
    }
}

fn validate_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("config").with_message("config must be a JSON object".into()))
    }
}

fn default_true() -> bool {
    true
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_applies_defaults() {
        let descriptor = PluginDescriptor::from_json(
            br#"{
                "slug": "seo",
                "name": "SEO",
                "version": "1.0.0",
                "entry_point": "builtin::seo",
                "hooks": [{"hook_name": "before_page_save", "handler": "before_page_save"}]
            }"#,
        )
        .unwrap();

        assert!(descriptor.is_active);
        assert_eq!(descriptor.config, serde_json::json!({}));
        assert_eq!(descriptor.hooks[0].priority, DEFAULT_PRIORITY);
        assert_eq!(descriptor.to_create().hooks.len(), 1);
    }

    #[test]
    fn test_rejects_bad_slug_and_config() {
        let bad_slug = br#"{"slug": "../etc", "name": "x", "version": "1", "entry_point": "e"}"#;
        assert!(matches!(
            PluginDescriptor::from_json(bad_slug),
            Err(PluginError::InvalidManifest(_))
        ));

        let bad_config =
            br#"{"slug": "ok", "name": "x", "version": "1", "entry_point": "e", "config": [1]}"#;
        assert!(matches!(
            PluginDescriptor::from_json(bad_config),
            Err(PluginError::InvalidManifest(_))
        ));

        let missing = br#"{"slug": "ok", "name": "x"}"#;
        assert!(PluginDescriptor::from_json(missing).is_err());
    }

    #[test]
    fn test_rejects_empty_hook_handler() {
        let json = br#"{"slug": "ok", "name": "x", "version": "1", "entry_point": "e",
            "hooks": [{"hook_name": "before_page_save", "handler": ""}]}"#;
        assert!(matches!(
            PluginDescriptor::from_json(json),
            Err(PluginError::InvalidManifest(_))
        ));
    }
}
