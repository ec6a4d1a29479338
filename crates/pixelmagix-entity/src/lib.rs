//! # pixelmagix-entity
//!
//! Domain entity models for PixelMagix. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow`; JSON columns are carried as `serde_json::Value`.

pub mod asset;
pub mod page;
pub mod plugin;
pub mod setting;
