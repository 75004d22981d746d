pub mod callback;
pub mod session;

use crate::error::AppError;

/// Method fallback for routes that exist but not for the requested verb.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
