//! HTTP-level tests for the authorization-code client against a mock provider.

use std::net::TcpListener;
use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use sessiongate_core::auth_code::AuthorizationCode;
use sessiongate_oauth::{IdentityProvider, OAuthClient, OAuthConfig, ProviderError, Stage};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> OAuthConfig {
    let mut config = OAuthConfig::new(
        "client-123".into(),
        "s3cret".into(),
        "https://gateway.test/callback".into(),
    );
    config.api_base = server.uri();
    config.timeout = Duration::from_millis(500);
    config
}

fn code(raw: &str) -> AuthorizationCode {
    AuthorizationCode::parse(Some(raw)).expect("valid test code")
}

async fn mount_token(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_identity(server: &MockServer, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .respond_with(response)
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn resolves_username_through_both_legs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("code=abc123"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=client-123"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fgateway.test%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok_x",
            "token_type": "Bearer",
            "expires_in": 604800,
            "scope": "identify"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/@me"))
        .and(header("authorization", "Bearer tok_x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "80351110224678912",
            "username": "alice",
            "discriminator": "0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let identity = client.resolve_identity(&code("abc123")).await.unwrap();

    assert_eq!(identity.username, "alice");
}

#[tokio::test]
async fn token_exchange_rejection_surfaces_provider_message() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid \"code\" in request."
        })),
    )
    .await;
    mount_identity(&server, ResponseTemplate::new(200), 0).await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("expired")).await.unwrap_err();

    assert_matches!(
        err,
        ProviderError::Status { stage: Stage::TokenExchange, status: 400, ref detail }
            if detail == "invalid_grant: Invalid \"code\" in request."
    );
}

#[tokio::test]
async fn missing_access_token_is_terminal() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })),
    )
    .await;
    mount_identity(&server, ResponseTemplate::new(200), 0).await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_matches!(
        err,
        ProviderError::MissingField { stage: Stage::TokenExchange, field: "access_token" }
    );
}

#[tokio::test]
async fn malformed_token_body_is_terminal() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
    )
    .await;
    mount_identity(&server, ResponseTemplate::new(200), 0).await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_matches!(err, ProviderError::MalformedBody { stage: Stage::TokenExchange, .. });
}

#[tokio::test]
async fn identity_without_username_is_missing_field() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok_x" })),
    )
    .await;
    mount_identity(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "id": "1", "avatar": null })),
        1,
    )
    .await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_matches!(
        err,
        ProviderError::MissingField { stage: Stage::IdentityLookup, field: "username" }
    );
}

#[tokio::test]
async fn identity_lookup_rejection_is_status_error() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "access_token": "tok_x" })),
    )
    .await;
    mount_identity(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({ "message": "401: Unauthorized", "code": 0 })),
        1,
    )
    .await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_matches!(
        err,
        ProviderError::Status { stage: Stage::IdentityLookup, status: 401, ref detail }
            if detail == "401: Unauthorized"
    );
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    mount_token(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(json!({ "access_token": "tok_x" }))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let client = OAuthClient::new(config(&server)).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_matches!(err, ProviderError::Timeout { stage: Stage::TokenExchange, .. });
}

/// A loopback base URL with nothing listening on it.
fn closed_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn unreachable_provider_is_request_error() {
    let server = MockServer::start().await;
    let mut config = config(&server);
    config.api_base = closed_port_base();

    let client = OAuthClient::new(config).unwrap();
    let err = client.resolve_identity(&code("abc123")).await.unwrap_err();

    assert_eq!(err.stage(), Stage::TokenExchange);
    assert_matches!(err, ProviderError::Request { .. });
}
