use std::time::Duration;

use reqwest::Url;
use sessiongate_core::session::{
    DEFAULT_SESSION_TTL_SECS, DEFAULT_STORE_TIMEOUT, MAX_SESSION_TTL_SECS,
};
use sessiongate_core::token::SESSION_TOKEN_LENGTH;
use sessiongate_oauth::config::{
    DEFAULT_API_BASE, DEFAULT_IDENTITY_PATH, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_TOKEN_PATH,
};
use sessiongate_oauth::OAuthConfig;

use crate::auth::orchestrator::SessionSettings;

/// A configuration value that is missing or does not parse.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Database connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Deadline for each store round-trip.
    pub store_timeout: Duration,
}

/// Server configuration loaded from environment variables.
///
/// Built once at startup and shared read-only; nothing reads the
/// environment after [`ServerConfig::from_env`] returns.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8081`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Budget for background tasks to stop after the listener closes (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Where a successful callback sends the browser, with `token` and
    /// `identity` appended as query parameters.
    pub login_redirect_url: Url,
    pub session: SessionSettings,
    pub oauth: OAuthConfig,
    pub database: DatabaseConfig,
    /// How often to purge expired sessions; `None` disables the reaper.
    pub session_reap_interval: Option<Duration>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                       |
    /// |------------------------------|-------------------------------|
    /// | `HOST`                       | `0.0.0.0`                     |
    /// | `PORT`                       | `8081`                        |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`       |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                          |
    /// | `SHUTDOWN_TIMEOUT_SECS`      | `30`                          |
    /// | `LOGIN_REDIRECT_URL`         | **required**                  |
    /// | `SESSION_TTL_SECS`           | `3600`                        |
    /// | `SESSION_TOKEN_LENGTH`       | `32`                          |
    /// | `SESSION_REAP_INTERVAL_SECS` | unset (reaper disabled)       |
    /// | `OAUTH_CLIENT_ID`            | **required**                  |
    /// | `OAUTH_CLIENT_SECRET`        | **required**                  |
    /// | `OAUTH_REDIRECT_URI`         | **required**                  |
    /// | `OAUTH_API_BASE`             | `https://discord.com/api/v10` |
    /// | `OAUTH_TOKEN_PATH`           | `/oauth2/token`               |
    /// | `OAUTH_IDENTITY_PATH`        | `/users/@me`                  |
    /// | `OAUTH_TIMEOUT_SECS`         | `5`                           |
    /// | `DATABASE_URL`               | **required**                  |
    /// | `DATABASE_MAX_CONNECTIONS`   | `10`                          |
    /// | `STORE_TIMEOUT_SECS`         | `5`                           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let cors_origins: Vec<String> = env
            .or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let login_redirect_url = env.required("LOGIN_REDIRECT_URL")?;
        let login_redirect_url =
            Url::parse(&login_redirect_url).map_err(|e| ConfigError::Invalid {
                var: "LOGIN_REDIRECT_URL",
                value: login_redirect_url.clone(),
                reason: e.to_string(),
            })?;

        let ttl_secs: i64 = env.parsed("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let ttl = (1..=MAX_SESSION_TTL_SECS)
            .contains(&ttl_secs)
            .then_some(ttl_secs)
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                var: "SESSION_TTL_SECS",
                value: ttl_secs.to_string(),
                reason: format!("must be between 1 and {MAX_SESSION_TTL_SECS}"),
            })?;

        let token_length: usize = env.parsed("SESSION_TOKEN_LENGTH", SESSION_TOKEN_LENGTH)?;
        if token_length == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_TOKEN_LENGTH",
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }

        let session_reap_interval = match env.get("SESSION_REAP_INTERVAL_SECS") {
            Some(_) => {
                let secs: u64 = env.parsed("SESSION_REAP_INTERVAL_SECS", 0)?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let oauth = OAuthConfig {
            client_id: env.required("OAUTH_CLIENT_ID")?,
            client_secret: env.required("OAUTH_CLIENT_SECRET")?,
            redirect_uri: env.required("OAUTH_REDIRECT_URI")?,
            api_base: env.or("OAUTH_API_BASE", DEFAULT_API_BASE),
            token_path: env.or("OAUTH_TOKEN_PATH", DEFAULT_TOKEN_PATH),
            identity_path: env.or("OAUTH_IDENTITY_PATH", DEFAULT_IDENTITY_PATH),
            timeout: env.positive_secs("OAUTH_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT)?,
        };

        let database = DatabaseConfig {
            url: env.required("DATABASE_URL")?,
            max_connections: env.parsed("DATABASE_MAX_CONNECTIONS", 10)?,
            store_timeout: env.positive_secs("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT)?,
        };

        Ok(Self {
            host: env.or("HOST", "0.0.0.0"),
            port: env.parsed("PORT", 8081)?,
            cors_origins,
            request_timeout_secs: env.parsed("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env.parsed("SHUTDOWN_TIMEOUT_SECS", 30)?,
            login_redirect_url,
            session: SessionSettings {
                ttl,
                token_length,
            },
            oauth,
            database,
            session_reap_interval,
        })
    }
}

/// Typed accessors over a variable lookup function.
struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn or(&self, var: &str, default: &str) -> String {
        self.get(var).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.get(var).ok_or(ConfigError::Missing(var))
    }

    fn parsed<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(var) {
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    /// A whole-second duration that must be non-zero.
    fn positive_secs(&self, var: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        match self.parsed(var, default.as_secs())? {
            0 => Err(ConfigError::Invalid {
                var,
                value: "0".into(),
                reason: "must be positive".into(),
            }),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}
