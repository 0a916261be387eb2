//! Convenience result type alias for Scantrack.

use crate::error::AppError;

/// A specialized `Result` type for Scantrack operations.
pub type AppResult<T> = Result<T, AppError>;
