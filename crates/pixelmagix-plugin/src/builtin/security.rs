//! Output hardening for rendered pages.
//!
//! Strips `<script>` elements and any tag carrying an inline `on*=` event
//! handler outside quoted attribute values, then adds a CSRF meta tag after `<head>`. The meta tag name is
//! the configured `csrf_header_name`.

use serde_json::Value;

use pixelmagix_core::markup;

use crate::contract::{Extension, HookContext};
use crate::error::ExtensionError;

/// Default name of the CSRF meta tag.
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-Token";

/// Placeholder the serving layer replaces with a real token.
const TOKEN_PLACEHOLDER: &str = "{csrf_token}";

/// The security plugin.
#[derive(Debug, Default)]
pub struct SecurityPlugin;

impl SecurityPlugin {
    /// Removes script elements and tags with inline event handlers.
    pub fn sanitize(html: &str) -> String {
        strip_event_handler_tags(&strip_scripts(html))
    }
}

fn strip_scripts(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = markup::find_open_tag(rest, "script") {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        match markup::find_ignore_case(after, "</script>") {
            Some(end) => rest = &after[end + "</script>".len()..],
            None => {
                // Unterminated: keep it as is.
                out.push_str(after);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_event_handler_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tag_and_after = &rest[open..];
        let Some(close) = tag_end(tag_and_after) else {
            out.push_str(tag_and_after);
            return out;
        };
        let tag = &tag_and_after[..=close];
        if !has_event_handler(tag) {
            out.push_str(tag);
        }
        rest = &tag_and_after[close + 1..];
    }
    out.push_str(rest);
    out
}

/// Offset of the `>` closing the tag at the start of `html`, skipping any
/// `>` inside quoted attribute values.
fn tag_end(html: &str) -> Option<usize> {
    let mut quote = None;
    for (i, b) in html.bytes().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(b),
            (None, b'>') => return Some(i),
            _ => {}
        }
    }
    None
}

/// Whether a tag carries an attribute like `onclick=`. Text inside quoted
/// attribute values is not inspected.
fn has_event_handler(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    let mut quote = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        if b == b'"' || b == b'\'' {
            quote = Some(b);
            i += 1;
            continue;
        }

        let boundary = i > 0
            && (bytes[i - 1].is_ascii_whitespace() || matches!(bytes[i - 1], b'"' | b'\'' | b'/'));
        if boundary && i + 2 < bytes.len() && bytes[i..i + 2].eq_ignore_ascii_case(b"on") {
            let name_len = bytes[i + 2..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count();
            let eq = bytes[i + 2 + name_len..]
                .iter()
                .position(|b| !b.is_ascii_whitespace())
                .map(|offset| i + 2 + name_len + offset);
            if name_len > 0 && eq.is_some_and(|eq| bytes[eq] == b'=') {
                return true;
            }
        }
        i += 1;
    }
    false
}

impl Extension for SecurityPlugin {
    fn name(&self) -> &str {
        "Security"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Sanitizes rendered markup and adds a CSRF meta tag"
    }

    fn on_page_export(
        &self,
        ctx: &HookContext<'_>,
        html: String,
        _page: &Value,
    ) -> Result<String, ExtensionError> {
        let header = ctx
            .config
            .get("csrf_header_name")
            .and_then(Value::as_str)
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_CSRF_HEADER);

        let clean = Self::sanitize(&html);
        let meta = format!(
            "<meta name=\"{}\" content=\"{TOKEN_PLACEHOLDER}\">",
            markup::escape(header)
        );
        Ok(markup::insert_after_head(&clean, &meta).unwrap_or(clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_strips_scripts_and_handlers() {
        let html = r#"<p>ok</p><SCRIPT type="x">alert(1)</script><img src="a.png" onerror="x()"><a href="/">link</a>"#;
        assert_eq!(SecurityPlugin::sanitize(html), r#"<p>ok</p><a href="/">link</a>"#);
    }

    #[test]
    fn test_sanitize_keeps_lookalike_attributes() {
        let html = r#"<div data-one="1" class="online">x</div>"#;
        assert_eq!(SecurityPlugin::sanitize(html), html);
    }

    #[test]
    fn test_sanitize_ignores_handler_text_inside_quoted_values() {
        let html = r#"<p title="go on=now">x</p><a title='a>b' href="/">y</a>"#;
        assert_eq!(SecurityPlugin::sanitize(html), html);
    }

    #[test]
    fn test_sanitize_strips_handler_after_quoted_gt() {
        let html = r#"<p>ok</p><img alt="a>b" onerror="x()"><b>z</b>"#;
        assert_eq!(SecurityPlugin::sanitize(html), "<p>ok</p><b>z</b>");
    }

    #[test]
    fn test_sanitize_strips_spaced_and_slash_separated_handlers() {
        assert_eq!(SecurityPlugin::sanitize(r#"<div onclick = "x()">a</div>"#), "a</div>");
        assert_eq!(SecurityPlugin::sanitize("<svg/onload=x()>b"), "b");
    }

    #[test]
    fn test_render_adds_csrf_meta_with_configured_name() {
        let page = Value::Null;
        let config = json!({"csrf_header_name": "X-Token"});
        let ctx = HookContext {
            event: "after_page_render",
            plugin: "security",
            config: &config,
            context: &page,
        };
        let out = SecurityPlugin
            .on_page_export(&ctx, "<html><head></head><body></body></html>".into(), &page)
            .unwrap();
        assert_eq!(
            out,
            "<html><head>\n<meta name=\"X-Token\" content=\"{csrf_token}\"></head><body></body></html>"
        );

        let default_config = json!({});
        let ctx = HookContext { config: &default_config, ..ctx };
        let out = SecurityPlugin
            .on_page_export(&ctx, "<head></head>".into(), &page)
            .unwrap();
        assert!(out.contains(DEFAULT_CSRF_HEADER));
    }
}
