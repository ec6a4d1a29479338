//! Plugins compiled into the server.

pub mod contact_form;
pub mod export;
pub mod security;
pub mod seo;

use serde_json::{Map, Value};

use crate::loader::PluginCatalog;

pub use contact_form::ContactFormPlugin;
pub use export::ExportPlugin;
pub use security::SecurityPlugin;
pub use seo::SeoPlugin;

/// Entry point of [`SeoPlugin`].
pub const SEO_ENTRY_POINT: &str = "builtin::seo";
/// Entry point of [`ContactFormPlugin`].
pub const CONTACT_FORM_ENTRY_POINT: &str = "builtin::contact_form";
/// Entry point of [`SecurityPlugin`].
pub const SECURITY_ENTRY_POINT: &str = "builtin::security";
/// Entry point of [`ExportPlugin`].
pub const EXPORT_ENTRY_POINT: &str = "builtin::export";

/// Registers every built-in plugin with the catalog.
pub fn register_all(catalog: &mut PluginCatalog) {
    catalog.register_default::<SeoPlugin>(SEO_ENTRY_POINT);
    catalog.register_default::<ContactFormPlugin>(CONTACT_FORM_ENTRY_POINT);
    catalog.register_default::<SecurityPlugin>(SECURITY_ENTRY_POINT);
    catalog.register_default::<ExportPlugin>(EXPORT_ENTRY_POINT);
}

/// Removes `map[key]` and returns it as an object, or an empty object when
/// it is missing or not an object.
pub(crate) fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

/// Reads `value.metadata.<key>` when present.
pub(crate) fn metadata_field<'a>(page: &'a Value, key: &str) -> Option<&'a Value> {
    page.get("metadata").and_then(|m| m.get(key))
}
