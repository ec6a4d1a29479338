//! # pixelmagix-plugin
//!
//! Plugin framework for PixelMagix. Provides:
//!
//! - The [`Extension`] contract every plugin implements
//! - A catalog resolving entry-point strings to plugin factories
//! - A hook registry with stable priority ordering and copy-on-write lists
//! - A dispatcher supporting chained and collected dispatch with
//!   per-handler failure isolation
//! - The [`PluginManager`] driving install, load, activate, deactivate,
//!   configuration updates and uninstall against persisted records

pub mod builtin;
pub mod config;
pub mod contract;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod package;
pub mod registry;

pub use config::LiveConfig;
pub use contract::{Extension, HookContext, HookFn};
pub use error::{ExtensionError, PluginError};
pub use hooks::{DispatchMode, HookDispatcher, HookPoint, HookRegistry};
pub use loader::PluginCatalog;
pub use manager::PluginManager;
pub use manifest::{HookDescriptor, PluginDescriptor};
pub use registry::PluginRegistry;
