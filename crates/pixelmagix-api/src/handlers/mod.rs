//! HTTP request handlers, one module per resource.

pub mod assets;
pub mod health;
pub mod pages;
pub mod plugins;
pub mod settings;
