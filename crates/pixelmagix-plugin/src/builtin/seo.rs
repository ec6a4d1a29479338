//! Search-engine metadata.
//!
//! On save, fills `metadata.seo.title` and `metadata.seo.description` from
//! the page when they are absent. With `default_meta_tags` enabled in the
//! plugin configuration it also appends the standard robots, viewport and
//! Open Graph tags to `metadata.seo.meta_tags`. On render, every entry of
//! `meta_tags` is written right after `<head>`.

use serde_json::{Map, Value, json};

use pixelmagix_core::markup;

use super::{metadata_field, take_object};
use crate::contract::{Extension, HookContext};
use crate::error::ExtensionError;

/// The SEO plugin.
#[derive(Debug, Default)]
pub struct SeoPlugin;

impl SeoPlugin {
    fn standard_tags(seo: &Map<String, Value>) -> Vec<Value> {
        let text = |key: &str| seo.get(key).and_then(Value::as_str).unwrap_or("").to_string();
        vec![
            json!({"name": "robots", "content": "index, follow"}),
            json!({"name": "viewport", "content": "width=device-width, initial-scale=1"}),
            json!({"property": "og:title", "content": text("title")}),
            json!({"property": "og:description", "content": text("description")}),
            json!({"property": "og:type", "content": "website"}),
        ]
    }

    fn merge_tags(existing: &mut Vec<Value>, defaults: Vec<Value>) {
        for tag in defaults {
            let duplicate = ["name", "property"].iter().any(|attr| {
                tag.get(*attr).is_some_and(|wanted| {
                    existing.iter().any(|t| t.get(*attr) == Some(wanted))
                })
            });
            if !duplicate {
                existing.push(tag);
            }
        }
    }

    fn render_tags(tags: &[Value]) -> String {
        let mut out = String::new();
        for tag in tags {
            let content = tag.get("content").and_then(Value::as_str).unwrap_or("");
            let (attr, key) = match (
                tag.get("name").and_then(Value::as_str),
                tag.get("property").and_then(Value::as_str),
            ) {
                (Some(name), _) => ("name", name),
                (None, Some(property)) => ("property", property),
                (None, None) => continue,
            };
            out.push_str(&format!(
                "<meta {attr}=\"{}\" content=\"{}\">\n",
                markup::escape(key),
                markup::escape(content)
            ));
        }
        out
    }
}

impl Extension for SeoPlugin {
    fn name(&self) -> &str {
        "SEO"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Fills search-engine metadata and writes meta tags into rendered pages"
    }

    fn frontend_components(&self) -> Map<String, Value> {
        let mut components = Map::new();
        components.insert(
            "SeoPanel".to_string(),
            json!({
                "label": "SEO",
                "fields": ["title", "description", "meta_tags"],
            }),
        );
        components
    }

    fn on_page_save(&self, ctx: &HookContext<'_>, page: Value) -> Result<Value, ExtensionError> {
        let Value::Object(mut page) = page else {
            return Ok(page);
        };

        let mut metadata = take_object(&mut page, "metadata");
        let mut seo = take_object(&mut metadata, "seo");

        for key in ["title", "description"] {
            if seo.contains_key(key) {
                continue;
            }
            if let Some(Value::String(text)) = page.get(key) {
                seo.insert(key.to_string(), Value::String(text.clone()));
            }
        }

        let wants_defaults = ctx
            .config
            .get("default_meta_tags")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if wants_defaults {
            let mut tags = match seo.remove("meta_tags") {
                Some(Value::Array(tags)) => tags,
                _ => Vec::new(),
            };
            Self::merge_tags(&mut tags, Self::standard_tags(&seo));
            seo.insert("meta_tags".to_string(), Value::Array(tags));
        }

        metadata.insert("seo".to_string(), Value::Object(seo));
        page.insert("metadata".to_string(), Value::Object(metadata));
        Ok(Value::Object(page))
    }

    fn on_page_export(
        &self,
        _ctx: &HookContext<'_>,
        html: String,
        page: &Value,
    ) -> Result<String, ExtensionError> {
        let tags = metadata_field(page, "seo")
            .and_then(|seo| seo.get("meta_tags"))
            .and_then(Value::as_array);
        let Some(tags) = tags else {
            return Ok(html);
        };

        let fragment = Self::render_tags(tags);
        if fragment.is_empty() {
            return Ok(html);
        }
        Ok(markup::insert_after_head(&html, fragment.trim_end()).unwrap_or(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(config: &'a Value, context: &'a Value) -> HookContext<'a> {
        HookContext {
            event: "before_page_save",
            plugin: "seo",
            config,
            context,
        }
    }

    #[test]
    fn test_injects_title_when_absent() {
        let config = json!({});
        let out = SeoPlugin
            .on_page_save(&ctx(&config, &Value::Null), json!({"title": "Foo"}))
            .unwrap();
        assert_eq!(out, json!({"title": "Foo", "metadata": {"seo": {"title": "Foo"}}}));
    }

    #[test]
    fn test_keeps_explicit_values() {
        let config = json!({});
        let page = json!({
            "title": "Foo",
            "description": "About foo",
            "metadata": {"seo": {"title": "Custom"}, "theme": "dark"}
        });
        let out = SeoPlugin.on_page_save(&ctx(&config, &Value::Null), page).unwrap();
        assert_eq!(out["metadata"]["seo"]["title"], "Custom");
        assert_eq!(out["metadata"]["seo"]["description"], "About foo");
        assert_eq!(out["metadata"]["theme"], "dark");
    }

    #[test]
    fn test_default_meta_tags_do_not_duplicate() {
        let config = json!({"default_meta_tags": true});
        let page = json!({
            "title": "Foo",
            "metadata": {"seo": {"meta_tags": [{"name": "robots", "content": "noindex"}]}}
        });
        let out = SeoPlugin.on_page_save(&ctx(&config, &Value::Null), page).unwrap();
        let tags = out["metadata"]["seo"]["meta_tags"].as_array().unwrap();

        assert_eq!(tags.len(), 5);
        assert_eq!(tags[0], json!({"name": "robots", "content": "noindex"}));
        assert!(tags.contains(&json!({"property": "og:title", "content": "Foo"})));
    }

    #[test]
    fn test_render_writes_tags_after_head() {
        let config = json!({});
        let page = json!({
            "metadata": {"seo": {"meta_tags": [
                {"name": "robots", "content": "index, follow"},
                {"property": "og:title", "content": "A \"quoted\" title"}
            ]}}
        });
        let html = "<html><head><title>x</title></head><body></body></html>".to_string();
        let out = SeoPlugin.on_page_export(&ctx(&config, &page), html, &page).unwrap();

        assert!(out.starts_with(
            "<html><head>\n<meta name=\"robots\" content=\"index, follow\">\n\
             <meta property=\"og:title\" content=\"A &quot;quoted&quot; title\"><title>"
        ));
    }

    #[test]
    fn test_render_without_tags_is_identity() {
        let config = json!({});
        let page = json!({"title": "Foo"});
        let html = "<html><head></head></html>".to_string();
        let out = SeoPlugin.on_page_export(&ctx(&config, &page), html.clone(), &page).unwrap();
        assert_eq!(out, html);
    }
}
