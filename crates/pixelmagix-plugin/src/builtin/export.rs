//! Export optimization.
//!
//! On export the document is wrapped in a full HTML skeleton when it lacks a
//! doctype, missing head tags (title, description, canonical link, Open Graph)
//! are filled in from `metadata.seo` or the page itself, and the markup is
//! minified unless `minify_html` is false. Canonical and `og:url` tags need a
//! configured `base_url`.

use serde_json::Value;

use pixelmagix_core::markup;

use super::metadata_field;
use crate::contract::{Extension, HookContext};
use crate::error::ExtensionError;

const UNTITLED: &str = "Untitled Page";
const DOCTYPE: &str = "<!DOCTYPE html>";

/// Elements whose content is copied verbatim by [`ExportPlugin::minify`].
const PRESERVED: [&str; 4] = ["pre", "textarea", "script", "style"];

/// The export plugin.
#[derive(Debug, Default)]
pub struct ExportPlugin;

/// Head values derived from a page.
struct HeadValues {
    title: String,
    description: String,
    url: Option<String>,
}

impl HeadValues {
    fn from_page(page: &Value, config: &Value) -> Self {
        let seo = metadata_field(page, "seo");
        let pick = |key: &str| {
            seo.and_then(|s| s.get(key))
                .and_then(Value::as_str)
                .or_else(|| page.get(key).and_then(Value::as_str))
        };

        let url = seo
            .and_then(|s| s.get("canonical_url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                let base = config.get("base_url").and_then(Value::as_str)?;
                let base = base.trim_end_matches('/');
                if base.is_empty() {
                    return None;
                }
                let slug = page.get("slug").and_then(Value::as_str).unwrap_or_default();
                Some(format!("{base}/{slug}"))
            });

        Self {
            title: pick("title").unwrap_or(UNTITLED).to_string(),
            description: pick("description").unwrap_or_default().to_string(),
            url,
        }
    }
}

impl ExportPlugin {
    /// Wraps bare markup in a document and adds missing head tags.
    fn optimize(html: &str, page: &Value, config: &Value) -> String {
        let values = HeadValues::from_page(page, config);

        let has_doctype = html
            .trim_start()
            .get(..DOCTYPE.len())
            .is_some_and(|start| start.eq_ignore_ascii_case(DOCTYPE));
        let document = if has_doctype {
            html.to_string()
        } else {
            format!(
                r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body>
    {html}
</body>
</html>"#
            )
        };

        let Some(head) = head_section(&document) else {
            return document;
        };
        let has = |needle: &str| markup::find_ignore_case(head, needle).is_some();

        let title = markup::escape(&values.title);
        let description = markup::escape(&values.description);
        let mut tags = Vec::new();
        if !has("<title") {
            tags.push(format!("<title>{title}</title>"));
        }
        if !has(r#"name="description""#) {
            tags.push(format!(r#"<meta name="description" content="{description}">"#));
        }
        if let Some(url) = &values.url
            && !has(r#"rel="canonical""#)
        {
            tags.push(format!(r#"<link rel="canonical" href="{}">"#, markup::escape(url)));
        }
        if !has(r#"property="og:title""#) {
            tags.push(format!(r#"<meta property="og:title" content="{title}">"#));
        }
        if !has(r#"property="og:description""#) {
            tags.push(format!(r#"<meta property="og:description" content="{description}">"#));
        }
        if !has(r#"property="og:type""#) {
            tags.push(r#"<meta property="og:type" content="website">"#.to_string());
        }
        if let Some(url) = &values.url
            && !has(r#"property="og:url""#)
        {
            tags.push(format!(r#"<meta property="og:url" content="{}">"#, markup::escape(url)));
        }

        if tags.is_empty() {
            return document;
        }
        let fragment = format!("    {}", tags.join("\n    "));
        markup::insert_after_head(&document, &fragment).unwrap_or(document)
    }

    /// Drops comments (conditional comments stay), collapses whitespace runs
    /// and removes whitespace between tags. Content of `pre`, `textarea`,
    /// `script` and `style` elements is left untouched.
    pub fn minify(html: &str) -> String {
        let mut out = String::with_capacity(html.len());
        let mut rest = html;

        while let Some(c) = rest.chars().next() {
            if rest.starts_with("<!--") && !rest.starts_with("<!--[if") {
                match rest.find("-->") {
                    Some(end) => {
                        rest = &rest[end + 3..];
                        continue;
                    }
                    None => {
                        out.push_str(rest);
                        break;
                    }
                }
            }

            if c == '<'
                && let Some(name) = PRESERVED.iter().find(|name| opens_element(rest, name))
            {
                let closing = format!("</{name}>");
                let end = markup::find_ignore_case(rest, &closing)
                    .map_or(rest.len(), |at| at + closing.len());
                out.push_str(&rest[..end]);
                rest = &rest[end..];
                continue;
            }

            if c.is_whitespace() {
                let run = rest.len() - rest.trim_start().len();
                let next = rest[run..].chars().next();
                let between_tags = out.ends_with('>') && next == Some('<');
                if !between_tags && !out.is_empty() && next.is_some() {
                    out.push(' ');
                }
                rest = &rest[run..];
                continue;
            }

            out.push(c);
            rest = &rest[c.len_utf8()..];
        }

        out
    }
}

/// Whether `html` starts with an opening `<name>` tag, ignoring case.
fn opens_element(html: &str, name: &str) -> bool {
    let bytes = html.as_bytes();
    let end = 1 + name.len();
    bytes.first() == Some(&b'<')
        && bytes
            .get(1..end)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(name.as_bytes()))
        && bytes
            .get(end)
            .is_some_and(|b| *b == b'>' || *b == b'/' || b.is_ascii_whitespace())
}

/// The text between `<head>` and `</head>`.
fn head_section(html: &str) -> Option<&str> {
    let start = markup::find_open_tag(html, "head")?;
    let open_end = html[start..].find('>')? + start + 1;
    let close = markup::find_ignore_case(&html[open_end..], "</head>")? + open_end;
    Some(&html[open_end..close])
}

impl Extension for ExportPlugin {
    fn name(&self) -> &str {
        "Export"
    }

    fn version(&self) -> &str {
        "1.0.0"
    }

    fn description(&self) -> &str {
        "Produces clean, search-friendly markup for exported pages"
    }

    fn on_page_export(
        &self,
        ctx: &HookContext<'_>,
        html: String,
        page: &Value,
    ) -> Result<String, ExtensionError> {
        let optimized = Self::optimize(&html, page, ctx.config);
        let minify = ctx
            .config
            .get("minify_html")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        Ok(if minify { Self::minify(&optimized) } else { optimized })
    }
}
