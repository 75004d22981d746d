//! Session token generation.
//!
//! Tokens are opaque bearer credentials drawn from the 62-character
//! alphanumeric alphabet. Uniqueness across live sessions is probabilistic:
//! at the default length the token carries ~190 bits of entropy.

use rand::Rng;

/// Default length of a generated session token.
pub const SESSION_TOKEN_LENGTH: usize = 32;

/// Generate a random session token of exactly `length` characters.
///
/// Characters are sampled uniformly from `A-Z`, `a-z` and `0-9` using the
/// thread-local CSPRNG, which is seeded from the operating system.
///
/// # Panics
///
/// Panics if the operating system cannot provide entropy to seed the RNG.
pub fn generate_session_token(length: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
