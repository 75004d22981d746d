use std::sync::Arc;

use sessiongate_core::session::SessionStore;

use crate::auth::orchestrator::Authenticator;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Session persistence, shared with the authenticator and the reaper.
    pub store: Arc<dyn SessionStore>,
    /// The callback pipeline.
    pub authenticator: Arc<Authenticator>,
    pub config: Arc<ServerConfig>,
}
