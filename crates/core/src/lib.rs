//! Domain types and pure logic for the session gateway.
//!
//! This crate has no database or HTTP dependencies. It defines the session
//! model, the [`session::SessionStore`] seam implemented by `sessiongate-db`,
//! token generation and authorization-code validation.

pub mod auth_code;
pub mod error;
pub mod memory_store;
pub mod session;
pub mod token;
pub mod types;
