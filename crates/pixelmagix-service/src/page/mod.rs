//! Landing pages: CRUD with page-save hooks, rendering and static export.

pub mod export;
pub mod render;
pub mod service;

pub use export::{ExportResult, ExportService};
pub use service::{ListPagesQuery, PageService};
