pub mod orchestrator;

pub use orchestrator::{AuthError, AuthStep, Authenticator, IssuedSession, SessionSettings};
