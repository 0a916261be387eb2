//! Bridges `validator` derive output into [`AppError`].

use validator::Validate;

use scantrack_core::error::{AppError, ErrorKind};
use scantrack_core::result::AppResult;

/// Run the derived validation rules and map failures to a validation error.
pub fn validate_input<T: Validate>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::with_source(ErrorKind::Validation, format!("Invalid input: {e}"), e))
}
