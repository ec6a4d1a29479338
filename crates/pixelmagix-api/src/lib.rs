//! # pixelmagix-api
//!
//! HTTP API layer for PixelMagix built on Axum.
//!
//! Provides the REST endpoints for pages, assets, settings and plugins,
//! the CORS layer, DTOs, and the mapping from application errors to HTTP
//! responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
