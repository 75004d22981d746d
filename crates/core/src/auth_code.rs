//! Syntactic validation of inbound OAuth2 authorization codes.
//!
//! Codes are never persisted. They are checked for presence, length and
//! character set before anything is sent to the identity provider.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum accepted authorization code length in bytes.
pub const MAX_CODE_LENGTH: usize = 512;

/// Alphanumerics plus the URL-unreserved punctuation `.`, `_`, `~` and `-`.
const CODE_PATTERN: &str = r"^[A-Za-z0-9._~-]+$";

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CODE_PATTERN).expect("valid regex"));

/// An authorization code that passed [`AuthorizationCode::parse`].
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode(String);

impl AuthorizationCode {
    /// Validate a raw query value.
    ///
    /// Rejects a missing or empty code, a code longer than
    /// [`MAX_CODE_LENGTH`], and any character outside [`CODE_PATTERN`].
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        let code = raw
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CoreError::Validation("Code must be provided".into()))?;

        if code.len() > MAX_CODE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Code exceeds {MAX_CODE_LENGTH} characters"
            )));
        }

        if !CODE_RE.is_match(code) {
            return Err(CoreError::Validation("Invalid code".into()));
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are single-use credentials; keep them out of logs.
impl fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthorizationCode")
            .field(&format_args!("<{} chars>", self.0.len()))
            .finish()
    }
}
