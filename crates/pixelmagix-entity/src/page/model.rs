//! Page entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::section::{PageSection, SectionInput};

/// A landing page.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Page {
    /// Unique page identifier.
    pub id: i64,
    /// Page title.
    pub title: String,
    /// URL slug, unique across pages.
    pub slug: String,
    /// Short description used for the meta description.
    pub description: Option<String>,
    /// Body markup.
    pub html_content: String,
    /// Stylesheet.
    pub css_content: String,
    /// Script, empty when the page has none.
    pub js_content: String,
    /// Editor component tree (JSON array).
    pub components: serde_json::Value,
    /// Editor style definitions (JSON object).
    pub styles: serde_json::Value,
    /// Free-form metadata that plugins read and write (JSON object).
    pub metadata: serde_json::Value,
    /// Whether the page is published.
    pub is_published: bool,
    /// When the page was created.
    pub created_at: DateTime<Utc>,
    /// When the page was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A page together with its ordered sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageWithSections {
    /// The page row.
    #[serde(flatten)]
    pub page: Page,
    /// Sections ordered by position.
    pub sections: Vec<PageSection>,
}

/// Partial page data as submitted by a client and transformed by
/// page-save hooks. Absent fields keep their previous (or default) value
/// and are left out when serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageInput {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// URL slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Body markup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    /// Stylesheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_content: Option<String>,
    /// Script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub js_content: Option<String>,
    /// Component tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<serde_json::Value>,
    /// Style definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<serde_json::Value>,
    /// Metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Published flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    /// Replacement section list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionInput>>,
}

impl PageInput {
    /// Fills every absent field except `sections` from the stored page, so
    /// page-save hooks see the full page rather than the submitted subset.
    pub fn fill_from(&mut self, existing: &Page) {
        self.title.get_or_insert_with(|| existing.title.clone());
        self.slug.get_or_insert_with(|| existing.slug.clone());
        if self.description.is_none() {
            self.description = existing.description.clone();
        }
        self.html_content
            .get_or_insert_with(|| existing.html_content.clone());
        self.css_content
            .get_or_insert_with(|| existing.css_content.clone());
        self.js_content
            .get_or_insert_with(|| existing.js_content.clone());
        self.components
            .get_or_insert_with(|| existing.components.clone());
        self.styles.get_or_insert_with(|| existing.styles.clone());
        self.metadata.get_or_insert_with(|| existing.metadata.clone());
        self.is_published.get_or_insert(existing.is_published);
    }
}

/// Fully resolved data required to persist a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavePage {
    /// Page title.
    pub title: String,
    /// URL slug.
    pub slug: String,
    /// Description.
    pub description: Option<String>,
    /// Body markup.
    pub html_content: String,
    /// Stylesheet.
    pub css_content: String,
    /// Script.
    pub js_content: String,
    /// Component tree.
    pub components: serde_json::Value,
    /// Style definitions.
    pub styles: serde_json::Value,
    /// Metadata.
    pub metadata: serde_json::Value,
    /// Published flag.
    pub is_published: bool,
}

impl SavePage {
    /// Resolve a create request, filling in defaults for absent fields.
    pub fn from_input(input: &PageInput, default_title: &str, default_slug: String) -> Self {
        Self {
            title: input
                .title
                .clone()
                .unwrap_or_else(|| default_title.to_string()),
            slug: input.slug.clone().unwrap_or(default_slug),
            description: input.description.clone(),
            html_content: input.html_content.clone().unwrap_or_default(),
            css_content: input.css_content.clone().unwrap_or_default(),
            js_content: input.js_content.clone().unwrap_or_default(),
            components: input
                .components
                .clone()
                .unwrap_or_else(|| serde_json::json!([])),
            styles: input
                .styles
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            metadata: input
                .metadata
                .clone()
                .unwrap_or_else(|| serde_json::json!({})),
            is_published: input.is_published.unwrap_or(false),
        }
    }

    /// Resolve an update request on top of the stored page.
    pub fn merged(existing: &Page, input: &PageInput) -> Self {
        Self {
            title: input.title.clone().unwrap_or_else(|| existing.title.clone()),
            slug: input.slug.clone().unwrap_or_else(|| existing.slug.clone()),
            description: input
                .description
                .clone()
                .or_else(|| existing.description.clone()),
            html_content: input
                .html_content
                .clone()
                .unwrap_or_else(|| existing.html_content.clone()),
            css_content: input
                .css_content
                .clone()
                .unwrap_or_else(|| existing.css_content.clone()),
            js_content: input
                .js_content
                .clone()
                .unwrap_or_else(|| existing.js_content.clone()),
            components: input
                .components
                .clone()
                .unwrap_or_else(|| existing.components.clone()),
            styles: input
                .styles
                .clone()
                .unwrap_or_else(|| existing.styles.clone()),
            metadata: input
                .metadata
                .clone()
                .unwrap_or_else(|| existing.metadata.clone()),
            is_published: input.is_published.unwrap_or(existing.is_published),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_fills_defaults() {
        let input: PageInput = serde_json::from_value(serde_json::json!({"title": "Foo"})).unwrap();
        let page = SavePage::from_input(&input, "New page", "page-1".to_string());

        assert_eq!(page.title, "Foo");
        assert_eq!(page.slug, "page-1");
        assert_eq!(page.components, serde_json::json!([]));
        assert_eq!(page.metadata, serde_json::json!({}));
        assert!(!page.is_published);
    }

    #[test]
    fn test_merged_keeps_absent_fields() {
        let now = Utc::now();
        let existing = Page {
            id: 1,
            title: "Old".into(),
            slug: "old".into(),
            description: Some("desc".into()),
            html_content: "<p>hi</p>".into(),
            css_content: String::new(),
            js_content: String::new(),
            components: serde_json::json!([]),
            styles: serde_json::json!({}),
            metadata: serde_json::json!({"a": 1}),
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        let input = PageInput {
            title: Some("New".into()),
            ..Default::default()
        };

        let merged = SavePage::merged(&existing, &input);
        assert_eq!(merged.title, "New");
        assert_eq!(merged.slug, "old");
        assert_eq!(merged.html_content, "<p>hi</p>");
        assert_eq!(merged.metadata, serde_json::json!({"a": 1}));
        assert!(merged.is_published);
    }

    #[test]
    fn test_fill_from_keeps_submitted_fields() {
        let now = Utc::now();
        let existing = Page {
            id: 1,
            title: "Old".into(),
            slug: "old".into(),
            description: None,
            html_content: "<p>hi</p>".into(),
            css_content: String::new(),
            js_content: String::new(),
            components: serde_json::json!([]),
            styles: serde_json::json!({}),
            metadata: serde_json::json!({"theme": "dark"}),
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        let mut input = PageInput {
            title: Some("New".into()),
            ..Default::default()
        };

        input.fill_from(&existing);

        assert_eq!(input.title.as_deref(), Some("New"));
        assert_eq!(input.slug.as_deref(), Some("old"));
        assert_eq!(input.metadata, Some(serde_json::json!({"theme": "dark"})));
        assert_eq!(input.is_published, Some(true));
        assert!(input.description.is_none());
        assert!(input.sections.is_none());
    }
}
