use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sessiongate_core::error::CoreError;
use sessiongate_core::session::StoreError;
use sessiongate_oauth::ProviderError;

use crate::auth::orchestrator::AuthError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the typed errors of the core, provider and store layers and adds
/// HTTP-specific variants. Implements [`IntoResponse`] to produce
/// consistent JSON error responses that never carry provider payloads, SQL
/// text or credentials.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sessiongate_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The identity provider failed or rejected the exchange.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The route exists but not for this HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidInput(e) => AppError::Core(e),
            AuthError::Provider(e) => AppError::Provider(e),
            AuthError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            AppError::Provider(err) => {
                tracing::warn!(error = %err, stage = %err.stage(), "Identity provider failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_PROVIDER_FAILURE",
                    "The identity provider could not complete the login".to_string(),
                )
            }

            AppError::Store(err) => classify_store_error(err),

            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Map a store failure to a 500, telling the client whether a retry is
/// worthwhile.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, transient = err.is_transient(), "Session store error");

    let message = if err.is_transient() {
        "Session store temporarily unavailable, please retry"
    } else {
        "An internal error occurred"
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORE_ERROR",
        message.to_string(),
    )
}
