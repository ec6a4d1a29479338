//! Typed key/value setting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// How a setting's stored text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    /// Plain text.
    String,
    /// Integer or floating point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Arbitrary JSON document.
    Json,
}

impl SettingType {
    /// Infer the type of a JSON value.
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(_) => Self::String,
            serde_json::Value::Number(_) => Self::Number,
            serde_json::Value::Bool(_) => Self::Boolean,
            _ => Self::Json,
        }
    }

    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted setting row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    /// Setting key.
    pub key: String,
    /// Stored textual value.
    pub value: String,
    /// Interpretation of `value`.
    pub value_type: SettingType,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// When the setting was last written.
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    /// Encode a JSON value into its stored text and type.
    pub fn encode(value: &serde_json::Value) -> (String, SettingType) {
        let kind = SettingType::of(value);
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        (text, kind)
    }

    /// Decode the stored text according to its type.
    ///
    /// Values that fail to parse fall back to a JSON string.
    pub fn typed_value(&self) -> serde_json::Value {
        match self.value_type {
            SettingType::String => serde_json::Value::String(self.value.clone()),
            SettingType::Boolean => match self.value.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => serde_json::Value::Bool(true),
                "false" | "0" | "no" => serde_json::Value::Bool(false),
                _ => serde_json::Value::String(self.value.clone()),
            },
            SettingType::Number | SettingType::Json => serde_json::from_str(&self.value)
                .unwrap_or_else(|_| serde_json::Value::String(self.value.clone())),
        }
    }
}
