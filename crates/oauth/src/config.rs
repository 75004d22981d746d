use std::fmt;
use std::time::Duration;

/// Discord API v10, the provider the gateway was first deployed against.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_TOKEN_PATH: &str = "/oauth2/token";
pub const DEFAULT_IDENTITY_PATH: &str = "/users/@me";
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Registered client credentials and provider endpoints.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI registered with the provider; echoed in the token exchange.
    pub redirect_uri: String,
    /// Provider API base, without a trailing slash.
    pub api_base: String,
    pub token_path: String,
    pub identity_path: String,
    /// Deadline for each provider request, connect through body.
    pub timeout: Duration,
}

impl OAuthConfig {
    /// Config with the default endpoints and timeout.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            api_base: DEFAULT_API_BASE.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            identity_path: DEFAULT_IDENTITY_PATH.to_string(),
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), self.token_path)
    }

    pub fn identity_url(&self) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), self.identity_path)
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_base", &self.api_base)
            .field("token_path", &self.token_path)
            .field("identity_path", &self.identity_path)
            .field("timeout", &self.timeout)
            .finish()
    }
}
