//! Concrete repository implementations.

pub mod asset;
pub mod page;
pub mod plugin;
pub mod setting;
