//! Convenience result type alias for BookHub.

use crate::error::AppError;

/// A specialized `Result` type for BookHub operations.
pub type AppResult<T> = Result<T, AppError>;
