//! Base HTML document for a page, before render hooks run.

use pixelmagix_core::markup::escape;
use pixelmagix_entity::page::Page;

/// Stylesheet file name referenced by the document and written by export.
pub const STYLESHEET: &str = "style.css";
/// Script file name referenced by the document and written by export.
pub const SCRIPT: &str = "script.js";

/// Builds the standalone document for a page.
///
/// Body markup is inserted verbatim; title and description are escaped.
pub fn document(page: &Page) -> String {
    let script = if page.js_content.trim().is_empty() {
        String::new()
    } else {
        format!("\n    <script src=\"{SCRIPT}\"></script>")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="stylesheet" href="{STYLESHEET}">
</head>
<body>
    {body}{script}
</body>
</html>
"#,
        title = escape(&page.title),
        description = escape(page.description.as_deref().unwrap_or("")),
        body = page.html_content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn page(js: &str) -> Page {
        Page {
            id: 1,
            title: "Tom & Jerry".into(),
            slug: "tj".into(),
            description: Some("A \"classic\"".into()),
            html_content: "<main>hi</main>".into(),
            css_content: String::new(),
            js_content: js.into(),
            components: json!([]),
            styles: json!({}),
            metadata: json!({}),
            is_published: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_document_escapes_head_fields() {
        let html = document(&page(""));
        assert!(html.contains("<title>Tom &amp; Jerry</title>"));
        assert!(html.contains(r#"content="A &quot;classic&quot;""#));
        assert!(html.contains("<main>hi</main>"));
        assert!(!html.contains(SCRIPT));
    }

    #[test]
    fn test_document_links_script_when_present() {
        let html = document(&page("console.log(1)"));
        assert!(html.contains(r#"<script src="script.js"></script>"#));
    }
}
