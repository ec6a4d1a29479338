//! Setting reads, writes and first-start defaults.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use pixelmagix_core::config::StorageConfig;
use pixelmagix_core::error::AppError;
use pixelmagix_database::repositories::setting::SettingRepository;
use pixelmagix_entity::setting::Setting;

const MAX_KEY_LEN: usize = 100;

/// Manages key/value settings.
#[derive(Debug, Clone)]
pub struct SettingService {
    /// Setting repository.
    repo: Arc<SettingRepository>,
}

impl SettingService {
    /// Creates a new setting service.
    pub fn new(repo: Arc<SettingRepository>) -> Self {
        Self { repo }
    }

    /// All settings, ordered by key.
    pub async fn list(&self) -> Result<Vec<Setting>, AppError> {
        self.repo.find_all().await
    }

    /// One setting.
    pub async fn get(&self, key: &str) -> Result<Setting, AppError> {
        self.repo
            .find_by_key(key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Setting '{key}' not found")))
    }

    /// Creates or replaces a setting. The stored type follows the JSON type
    /// of `value`; `null` is rejected.
    pub async fn set(
        &self,
        key: &str,
        value: &Value,
        description: Option<&str>,
    ) -> Result<Setting, AppError> {
        validate_key(key)?;
        if value.is_null() {
            return Err(AppError::validation("Setting value must not be null"));
        }

        let (text, value_type) = Setting::encode(value);
        let setting = self
            .repo
            .upsert(key, &text, value_type, description)
            .await?;
        info!(key = %key, value_type = %value_type, "Setting saved");
        Ok(setting)
    }

    /// Inserts the default settings that are not present yet. Returns how
    /// many were added.
    pub async fn seed_defaults(&self, storage: &StorageConfig) -> Result<usize, AppError> {
        let mut added = 0;
        for (key, value, description) in default_settings(storage) {
            let (text, value_type) = Setting::encode(&value);
            if self
                .repo
                .insert_if_absent(key, &text, value_type, Some(description))
                .await?
            {
                added += 1;
            }
        }
        if added > 0 {
            info!(count = added, "Default settings seeded");
        }
        Ok(added)
    }
}

/// Settings created on first start.
pub fn default_settings(storage: &StorageConfig) -> Vec<(&'static str, Value, &'static str)> {
    vec![
        ("site_name", json!("PixelMagix"), "Name of the site"),
        (
            "site_description",
            json!("Landing pages built with PixelMagix"),
            "Default site description",
        ),
        (
            "default_export_path",
            json!(storage.export_dir),
            "Directory static exports are written to",
        ),
        ("enable_ai", json!(true), "Enable AI content generation"),
    ]
}

fn validate_key(key: &str) -> Result<(), AppError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("Invalid setting key '{key}'")))
    }
}
