pub mod callback;
pub mod health;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /session          current session (GET), logout (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/session", session::router())
}
