//! # pixelmagix-service
//!
//! Business logic for PixelMagix. Services orchestrate the repositories and
//! the plugin manager: page saves and renders run through the plugin hooks,
//! assets are written to the media directory, settings are typed.
//!
//! Services take their dependencies at construction time via `Arc`
//! references and are cheap to clone.

pub mod asset;
pub mod page;
pub mod setting;

pub use asset::{AssetService, UploadAsset};
pub use page::{ExportResult, ExportService, ListPagesQuery, PageService};
pub use setting::SettingService;
