//! Contact form block.
//!
//! Pages opt in through `metadata.contact_form.enabled`. Saving a page makes
//! sure the flag exists; rendering an enabled page appends the form before
//! `</body>`.

use serde_json::{Map, Value, json};

use pixelmagix_core::markup;

use super::{metadata_field, take_object};
use crate::contract::{Extension, HookContext};
use crate::error::ExtensionError;

const DEFAULT_TITLE: &str = "Contact us";
const DEFAULT_SUBTITLE: &str = "We look forward to your message";
const DEFAULT_ACTION: &str = "/contact";

/// The contact form plugin.
#[derive(Debug, Default)]
pub struct ContactFormPlugin;

impl ContactFormPlugin {
    fn form_html(form: &Value, config: &Value) -> String {
        let text = |source: &Value, key: &str, fallback: &str| {
            markup::escape(source.get(key).and_then(Value::as_str).unwrap_or(fallback))
        };
        let title = text(form, "title", DEFAULT_TITLE);
        let subtitle = text(form, "subtitle", DEFAULT_SUBTITLE);
        let action = text(config, "action", DEFAULT_ACTION);
        let recipient = text(config, "email_recipient", "");

        format!(
            r#"<div class="contact-form-container" id="contact-form">
  <h2>{title}</h2>
  <p>{subtitle}</p>
  <form method="post" action="{action}" data-recipient="{recipient}">
    <label for="cf-name">Name *</label>
    <input type="text" id="cf-name" name="name" required>
    <label for="cf-email">Email *</label>
    <input type="email" id="cf-email" name="email" required>
    <label for="cf-phone">Phone</label>
    <input type="tel" id="cf-phone" name="phone">
    <label for="cf-message">Message *</label>
    <textarea id="cf-message" name="message" rows="5" required></textarea>
    <button type="submit">Send</button>
  </form>
</div>"#
        )
    }
}

impl Extension for ContactFormPlugin {
    fn name(&self) -> &str {
        "Contact Form"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Adds a configurable contact form to landing pages"
    }

    fn frontend_components(&self) -> Map<String, Value> {
        let mut components = Map::new();
        components.insert(
            "ContactForm".to_string(),
            json!({
                "label": "Contact form",
                "props": {"title": "string", "subtitle": "string", "enabled": "boolean"},
            }),
        );
        components
    }

    fn editor_blocks(&self) -> Vec<Value> {
        vec![json!({
            "id": "contact-form",
            "label": "Contact form",
            "category": "Forms",
            "content": Self::form_html(&Value::Null, &Value::Null),
        })]
    }

    fn on_page_save(&self, _ctx: &HookContext<'_>, page: Value) -> Result<Value, ExtensionError> {
        let Value::Object(mut page) = page else {
            return Ok(page);
        };

        let mut metadata = take_object(&mut page, "metadata");
        if !metadata.get("contact_form").is_some_and(Value::is_object) {
            metadata.insert("contact_form".to_string(), json!({"enabled": false}));
        }
        page.insert("metadata".to_string(), Value::Object(metadata));
        Ok(Value::Object(page))
    }

    fn on_page_export(
        &self,
        ctx: &HookContext<'_>,
        html: String,
        page: &Value,
    ) -> Result<String, ExtensionError> {
        let Some(form) = metadata_field(page, "contact_form") else {
            return Ok(html);
        };
        if !form.get("enabled").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(html);
        }

        let block = Self::form_html(form, ctx.config);
        Ok(markup::insert_before_body_end(&html, &block).unwrap_or(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(config: &'a Value, context: &'a Value) -> HookContext<'a> {
        HookContext {
            event: "after_page_render",
            plugin: "contact-form",
            config,
            context,
        }
    }

    #[test]
    fn test_save_adds_disabled_flag() {
        let config = json!({});
        let out = ContactFormPlugin
            .on_page_save(&ctx(&config, &Value::Null), json!({"title": "Foo"}))
            .unwrap();
        assert_eq!(out["metadata"]["contact_form"], json!({"enabled": false}));

        let kept = ContactFormPlugin
            .on_page_save(
                &ctx(&config, &Value::Null),
                json!({"metadata": {"contact_form": {"enabled": true}}}),
            )
            .unwrap();
        assert_eq!(kept["metadata"]["contact_form"]["enabled"], true);
    }

    #[test]
    fn test_render_appends_form_when_enabled() {
        let config = json!({"action": "/api/contact"});
        let page = json!({"metadata": {"contact_form": {"enabled": true, "title": "Write <us>"}}});
        let html = "<html><body><p>hi</p></body></html>".to_string();
        let out = ContactFormPlugin
            .on_page_export(&ctx(&config, &page), html, &page)
            .unwrap();

        assert!(out.contains("<h2>Write &lt;us&gt;</h2>"));
        assert!(out.contains(r#"action="/api/contact""#));
        assert!(out.ends_with("</div>\n</body></html>"));
    }

    #[test]
    fn test_render_skips_disabled_form() {
        let config = json!({});
        let page = json!({"metadata": {"contact_form": {"enabled": false}}});
        let html = "<html><body></body></html>".to_string();
        let out = ContactFormPlugin
            .on_page_export(&ctx(&config, &page), html.clone(), &page)
            .unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_contributes_editor_block() {
        let blocks = ContactFormPlugin.editor_blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["id"], "contact-form");
    }
}
