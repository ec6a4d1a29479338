//! # pixelmagix-core
//!
//! Core crate for PixelMagix. Contains the configuration schema and the
//! unified error system shared by every other crate, plus HTML
//! string helpers used by rendering and the built-in plugins.
//!
//! This crate has **no** internal dependencies on other PixelMagix crates.

pub mod config;
pub mod error;
pub mod markup;
pub mod result;

pub use error::AppError;
pub use result::AppResult;
