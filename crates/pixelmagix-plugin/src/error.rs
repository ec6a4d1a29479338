//! Plugin subsystem errors.

use thiserror::Error;

use pixelmagix_core::error::{AppError, ErrorKind};

/// Errors raised by plugin lifecycle operations.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin with this slug is already installed.
    #[error("Plugin '{0}' is already installed")]
    DuplicateSlug(String),

    /// No plugin with this slug exists.
    #[error("Plugin '{0}' not found")]
    NotFound(String),

    /// A declared hook names a handler the loaded instance does not provide.
    #[error("Plugin '{plugin}' has no handler '{handler}' for hook '{event}'")]
    HandlerNotFound {
        /// Plugin slug.
        plugin: String,
        /// Hook event name.
        event: String,
        /// Declared handler name.
        handler: String,
    },

    /// The entry point could not be resolved, instantiated or initialized.
    #[error("Plugin '{plugin}' failed to load: {reason}")]
    LoadFailure {
        /// Plugin slug.
        plugin: String,
        /// Failure description.
        reason: String,
    },

    /// A hook handler failed during dispatch.
    #[error("Handler '{handler}' of plugin '{plugin}' failed on '{event}': {reason}")]
    HandlerExecution {
        /// Hook event name.
        event: String,
        /// Plugin slug.
        plugin: String,
        /// Handler name.
        handler: String,
        /// Failure description.
        reason: String,
    },

    /// The plugin descriptor or package is malformed.
    #[error("Invalid plugin manifest: {0}")]
    InvalidManifest(String),

    /// A configuration update was rejected.
    #[error("Invalid plugin configuration: {0}")]
    InvalidConfig(String),

    /// Persistence or filesystem failure.
    #[error(transparent)]
    Storage(#[from] AppError),
}

impl From<PluginError> for AppError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::Storage(inner) => inner,
            PluginError::DuplicateSlug(_) => AppError::new(ErrorKind::Conflict, err.to_string()),
            PluginError::NotFound(_) => AppError::new(ErrorKind::NotFound, err.to_string()),
            PluginError::InvalidManifest(_) | PluginError::InvalidConfig(_) => {
                AppError::new(ErrorKind::Validation, err.to_string())
            }
            PluginError::HandlerNotFound { .. }
            | PluginError::LoadFailure { .. }
            | PluginError::HandlerExecution { .. } => {
                AppError::new(ErrorKind::Plugin, err.to_string())
            }
        }
    }
}

/// Error returned by an extension callback.
///
/// Never crosses the dispatch boundary: the dispatcher logs it and moves on.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    /// Create an extension error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for ExtensionError {
    fn from(err: serde_json::Error) -> Self {
        Self(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_mapping() {
        let conflict: AppError = PluginError::DuplicateSlug("seo".into()).into();
        assert_eq!(conflict.kind, ErrorKind::Conflict);
        assert_eq!(conflict.message, "Plugin 'seo' is already installed");

        let missing: AppError = PluginError::NotFound("seo".into()).into();
        assert_eq!(missing.kind, ErrorKind::NotFound);

        let config: AppError = PluginError::InvalidConfig("not an object".into()).into();
        assert_eq!(config.kind, ErrorKind::Validation);

        let load: AppError = PluginError::LoadFailure {
            plugin: "seo".into(),
            reason: "boom".into(),
        }
        .into();
        assert_eq!(load.kind, ErrorKind::Plugin);

        let storage: AppError = PluginError::Storage(AppError::database("down")).into();
        assert_eq!(storage.kind, ErrorKind::Database);
    }
}
