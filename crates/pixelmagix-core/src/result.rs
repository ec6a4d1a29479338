//! Convenience result type alias for PixelMagix.

use crate::error::AppError;

/// A specialized `Result` type for PixelMagix operations.
pub type AppResult<T> = Result<T, AppError>;
