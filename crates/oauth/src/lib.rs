//! OAuth2 authorization-code client for resolving provider identities.
//!
//! Wraps the two-step authorization-code flow (code -> access token ->
//! current user) using [`reqwest`], with typed response schemas and an
//! error taxonomy that keeps every provider failure terminal.

pub mod client;
pub mod config;
pub mod error;
pub mod provider;

pub use client::OAuthClient;
pub use config::OAuthConfig;
pub use error::{ProviderError, Stage};
pub use provider::{IdentityProvider, ProviderIdentity};
