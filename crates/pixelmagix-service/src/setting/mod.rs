//! Typed site settings.

pub mod service;

pub use service::SettingService;
