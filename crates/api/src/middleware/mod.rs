//! Request extractors.
//!
//! - [`auth::SessionUser`] -- Resolves the caller's session from a Bearer token.

pub mod auth;
