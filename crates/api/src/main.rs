use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sessiongate_core::session::SessionStore;
use sessiongate_db::PgSessionStore;
use sessiongate_oauth::OAuthClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sessiongate_api::auth::Authenticator;
use sessiongate_api::background::session_reaper;
use sessiongate_api::config::ServerConfig;
use sessiongate_api::router::build_app_router;
use sessiongate_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sessiongate_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid configuration");
    tracing::info!(
        host = %config.host,
        port = %config.port,
        provider = %config.oauth.api_base,
        session_ttl_secs = config.session.ttl.num_seconds(),
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = sessiongate_db::create_pool(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    sessiongate_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    sessiongate_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store: Arc<dyn SessionStore> =
        Arc::new(PgSessionStore::new(pool, config.database.store_timeout));

    // --- Identity provider ---
    let provider = OAuthClient::new(config.oauth.clone()).expect("Failed to build HTTP client");

    let authenticator = Arc::new(Authenticator::new(
        Arc::new(provider),
        Arc::clone(&store),
        config.session.clone(),
    ));

    // --- Session reaper ---
    let reaper_cancel = tokio_util::sync::CancellationToken::new();
    let reaper_handle = config.session_reap_interval.map(|interval| {
        tokio::spawn(session_reaper::run(
            Arc::clone(&store),
            interval,
            reaper_cancel.clone(),
        ))
    });

    // --- App state ---
    let state = AppState {
        store,
        authenticator,
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    reaper_cancel.cancel();
    if let Some(handle) = reaper_handle {
        let budget = Duration::from_secs(config.shutdown_timeout_secs);
        if tokio::time::timeout(budget, handle).await.is_err() {
            tracing::warn!("Session reaper did not stop within the shutdown budget");
        }
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
