//! Uploaded media assets.

pub mod service;

pub use service::{AssetService, UploadAsset};
