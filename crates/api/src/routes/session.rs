//! Route definitions for the `/session` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{method_not_allowed, session};
use crate::state::AppState;

/// Routes mounted at `/session`.
///
/// ```text
/// GET    /  -> current_session (requires session token)
/// DELETE /  -> logout (requires session token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(session::current_session)
            .delete(session::logout)
            .fallback(method_not_allowed),
    )
}
