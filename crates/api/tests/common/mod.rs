#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use reqwest::Url;
use serde_json::json;
use sessiongate_core::session::{Session, SessionStore, StoreError, UpsertOutcome};
use sessiongate_oauth::{OAuthClient, OAuthConfig};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sessiongate_api::auth::{Authenticator, SessionSettings};
use sessiongate_api::config::{DatabaseConfig, ServerConfig};
use sessiongate_api::router::build_app_router;
use sessiongate_api::state::AppState;

pub const LOGIN_REDIRECT: &str = "https://app.example.com/welcome";

/// Build a test `ServerConfig` whose provider calls go to `provider_uri`.
pub fn test_config(provider_uri: &str) -> ServerConfig {
    let mut oauth = OAuthConfig::new(
        "client-123".into(),
        "s3cret".into(),
        "https://gateway.test/callback".into(),
    );
    oauth.api_base = provider_uri.to_string();
    oauth.timeout = Duration::from_millis(500);

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        login_redirect_url: Url::parse(LOGIN_REDIRECT).unwrap(),
        session: SessionSettings {
            ttl: chrono::Duration::hours(1),
            token_length: 32,
        },
        oauth,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            store_timeout: Duration::from_secs(5),
        },
        session_reap_interval: None,
    }
}

/// Build the full application router over `store`, talking to the provider
/// configured in `config`.
pub fn build_test_app(store: Arc<dyn SessionStore>, config: ServerConfig) -> Router {
    let provider = OAuthClient::new(config.oauth.clone()).unwrap();
    let authenticator = Arc::new(Authenticator::new(
        Arc::new(provider),
        Arc::clone(&store),
        config.session.clone(),
    ));

    let state = AppState {
        store,
        authenticator,
        config: Arc::new(config.clone()),
    };

    build_app_router(state, &config)
}

/// Mount a provider that resolves any code to `username` via `access_token`.
pub async fn mount_provider(server: &MockServer, access_token: &str, username: &str) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": access_token })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": username })))
        .mount(server)
        .await;
}

pub async fn send(app: Router, method: Method, uri: &str, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token)).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Parse the `Location` header of a redirect.
pub fn location(response: &Response<Body>) -> Url {
    let value = response
        .headers()
        .get("location")
        .expect("redirect should have a Location header")
        .to_str()
        .unwrap();
    Url::parse(value).unwrap()
}

/// Value of query parameter `name` in `url`.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// A store whose every operation fails, for exercising 500 paths.
pub struct FailingStore;

fn unavailable() -> StoreError {
    StoreError::Backend("connection refused".into())
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn exists(&self, _identity: &str) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn create(
        &self,
        _identity: &str,
        _token: &str,
        _ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        Err(unavailable())
    }

    async fn update(
        &self,
        _identity: &str,
        _token: &str,
        _ttl: chrono::Duration,
    ) -> Result<Session, StoreError> {
        Err(unavailable())
    }

    async fn upsert(
        &self,
        _identity: &str,
        _token: &str,
        _ttl: chrono::Duration,
    ) -> Result<(Session, UpsertOutcome), StoreError> {
        Err(unavailable())
    }

    async fn delete(&self, _identity: &str) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn revoke(&self, _identity: &str, _token: &str) -> Result<bool, StoreError> {
        Err(unavailable())
    }

    async fn find_active_by_token(&self, _token: &str) -> Result<Option<Session>, StoreError> {
        Err(unavailable())
    }

    async fn delete_expired(&self) -> Result<u64, StoreError> {
        Err(unavailable())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
