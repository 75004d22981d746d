use std::fmt;
use std::time::Duration;

/// Which leg of the authorization-code flow failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    TokenExchange,
    IdentityLookup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::TokenExchange => f.write_str("token exchange"),
            Stage::IdentityLookup => f.write_str("identity lookup"),
        }
    }
}

/// Errors from the identity provider. All of them are terminal for the
/// request in flight; retrying is a caller decision.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("{stage} request failed: {source}")]
    Request {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// The provider did not answer within the configured deadline.
    #[error("{stage} timed out after {timeout:?}")]
    Timeout { stage: Stage, timeout: Duration },

    /// The provider returned a non-2xx status. `detail` carries the
    /// provider's own error message when it sent a structured one.
    #[error("{stage} rejected ({status}): {detail}")]
    Status {
        stage: Stage,
        status: u16,
        detail: String,
    },

    /// The body was not the JSON document we expected.
    #[error("{stage} returned a malformed body: {source}")]
    MalformedBody {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but a required field was absent or empty.
    #[error("{stage} response is missing '{field}'")]
    MissingField { stage: Stage, field: &'static str },
}

impl ProviderError {
    pub fn stage(&self) -> Stage {
        match self {
            ProviderError::Request { stage, .. }
            | ProviderError::Timeout { stage, .. }
            | ProviderError::Status { stage, .. }
            | ProviderError::MalformedBody { stage, .. }
            | ProviderError::MissingField { stage, .. } => *stage,
        }
    }
}
