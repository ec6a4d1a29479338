//! Page section entity.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An ordered building block of a page (hero, features, contact...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PageSection {
    /// Unique section identifier.
    pub id: i64,
    /// Owning page.
    pub page_id: i64,
    /// Section name.
    pub name: String,
    /// Section type (e.g. `"hero"`).
    #[serde(rename = "type")]
    pub section_type: String,
    /// Section content (JSON object).
    pub content: serde_json::Value,
    /// Zero-based position within the page.
    pub position: i64,
}

/// Section data as submitted with a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionInput {
    /// Section name.
    pub name: String,
    /// Section type.
    #[serde(rename = "type")]
    pub section_type: String,
    /// Section content.
    #[serde(default = "empty_object")]
    pub content: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}
