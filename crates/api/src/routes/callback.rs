//! Route definition for the OAuth2 redirect target.

use axum::routing::get;
use axum::Router;

use crate::handlers::{callback, method_not_allowed};
use crate::state::AppState;

/// Mounted at the root, since the provider's registered redirect URI
/// points here directly.
///
/// ```text
/// GET /callback  -> callback
/// *   /callback  -> 405
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/callback",
        get(callback::callback).fallback(method_not_allowed),
    )
}
