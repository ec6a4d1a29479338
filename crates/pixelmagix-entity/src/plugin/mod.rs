//! Plugin domain entities.

pub mod hook;
pub mod model;

pub use hook::{CreatePluginHook, PluginHook};
pub use model::{CreatePlugin, Plugin, PluginWithHooks};
