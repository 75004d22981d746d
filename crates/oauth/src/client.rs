//! HTTP client for the provider's token and current-user endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sessiongate_core::auth_code::AuthorizationCode;

use crate::config::OAuthConfig;
use crate::error::{ProviderError, Stage};
use crate::provider::{IdentityProvider, ProviderIdentity};

/// Longest slice of an unstructured error body kept in [`ProviderError::Status`].
const MAX_DETAIL_LEN: usize = 256;

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

/// Successful current-user response.
#[derive(Debug, Deserialize)]
pub struct IdentityResponse {
    /// `username` on Discord-style APIs, `login` on GitHub-style ones.
    #[serde(alias = "login")]
    pub username: Option<String>,
}

/// Error payload shapes used by OAuth2 token endpoints (`error`,
/// `error_description`) and REST APIs (`message`).
#[derive(Debug, Default, Deserialize)]
pub struct ProviderErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub message: Option<String>,
}

impl ProviderErrorBody {
    /// The provider's own wording, verbatim, if it sent any.
    fn detail(&self) -> Option<String> {
        match (&self.error, &self.error_description, &self.message) {
            (Some(error), Some(description), _) => Some(format!("{error}: {description}")),
            (_, Some(description), _) => Some(description.clone()),
            (_, _, Some(message)) => Some(message.clone()),
            (Some(error), None, None) => Some(error.clone()),
            (None, None, None) => None,
        }
    }
}

/// OAuth2 authorization-code client for a single provider.
pub struct OAuthClient {
    client: reqwest::Client,
    config: OAuthConfig,
}

impl OAuthClient {
    /// Create a client whose requests are bounded by `config.timeout`.
    pub fn new(config: OAuthConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Sends a form-encoded `POST` to the token endpoint with the client
    /// credentials and the registered redirect URI.
    pub async fn exchange_code(&self, code: &AuthorizationCode) -> Result<String, ProviderError> {
        let stage = Stage::TokenExchange;
        let form = [
            ("code", code.as_str()),
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let request = self.client.post(self.config.token_url()).form(&form);
        let body: TokenResponse = self.send(stage, request).await?;

        body.access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingField {
                stage,
                field: "access_token",
            })
    }

    /// Fetch the current user for an access token.
    pub async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let stage = Stage::IdentityLookup;
        let request = self
            .client
            .get(self.config.identity_url())
            .bearer_auth(access_token);
        let body: IdentityResponse = self.send(stage, request).await?;

        let username = body
            .username
            .filter(|u| !u.is_empty())
            .ok_or(ProviderError::MissingField {
                stage,
                field: "username",
            })?;

        Ok(ProviderIdentity { username })
    }

    /// Send a request, check the status and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        stage: Stage,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(|e| self.transport(stage, e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport(stage, e))?;

        if !status.is_success() {
            let detail = status_detail(&bytes);
            tracing::warn!(%stage, status = status.as_u16(), %detail, "Identity provider rejected request");
            return Err(ProviderError::Status {
                stage,
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| ProviderError::MalformedBody { stage, source })
    }

    fn transport(&self, stage: Stage, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout {
                stage,
                timeout: self.config.timeout,
            }
        } else {
            ProviderError::Request { stage, source: err }
        }
    }
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    async fn resolve_identity(
        &self,
        code: &AuthorizationCode,
    ) -> Result<ProviderIdentity, ProviderError> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_identity(&access_token).await
    }
}

/// Prefer the provider's structured message; fall back to a bounded slice
/// of the raw body.
fn status_detail(bytes: &[u8]) -> String {
    if let Some(detail) = serde_json::from_slice::<ProviderErrorBody>(bytes)
        .ok()
        .and_then(|b| b.detail())
    {
        return detail;
    }

    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    trimmed.chars().take(MAX_DETAIL_LEN).collect()
}
