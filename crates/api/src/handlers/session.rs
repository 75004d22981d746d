//! Handlers for the `/session` resource (current session, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sessiongate_core::session::Session;

use crate::error::AppResult;
use crate::middleware::auth::SessionUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/session
///
/// Returns the caller's identity and expiry. The token itself is never
/// echoed back.
pub async fn current_session(user: SessionUser) -> Json<DataResponse<Session>> {
    Json(DataResponse { data: user.session })
}

/// DELETE /api/v1/session
///
/// Ends the caller's session. Only the presented token is revoked: a newer
/// session from a concurrent login survives. Either way the answer is 204.
pub async fn logout(State(state): State<AppState>, user: SessionUser) -> AppResult<StatusCode> {
    let deleted = state
        .store
        .revoke(&user.session.identity, &user.session.token)
        .await?;
    tracing::info!(identity = %user.session.identity, deleted, "Session ended");
    Ok(StatusCode::NO_CONTENT)
}
