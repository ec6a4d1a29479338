//! Setting domain entities.

pub mod model;

pub use model::{Setting, SettingType};
