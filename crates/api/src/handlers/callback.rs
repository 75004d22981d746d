//! Handler for the OAuth2 redirect target.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, LOCATION};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use reqwest::Url;
use serde::Deserialize;
use sessiongate_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Query string of `GET /callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// GET /callback?code=...
///
/// Runs the authentication pipeline and redirects the browser to the
/// post-login URL with the new session token and identity attached.
///
/// Axum routes HEAD to GET handlers, so the method is checked here: a HEAD
/// must not spend the code or rotate the session.
pub async fn callback(
    method: Method,
    State(state): State<AppState>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> AppResult<Response> {
    if method != Method::GET {
        return Err(AppError::MethodNotAllowed);
    }

    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "Unparseable callback query");
        AppError::Core(CoreError::Validation("Invalid query string".into()))
    })?;

    let issued = state
        .authenticator
        .authenticate(params.code.as_deref())
        .await?;

    let location = login_redirect(
        &state.config.login_redirect_url,
        &issued.session.token,
        &issued.session.identity,
    );

    Ok((
        StatusCode::FOUND,
        [
            (LOCATION, location.to_string()),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response())
}

/// Append `token` and `identity` to the configured redirect, keeping any
/// query parameters it already has.
fn login_redirect(base: &Url, token: &str, identity: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("identity", identity);
    url
}
