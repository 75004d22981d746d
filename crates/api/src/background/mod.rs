//! Periodic maintenance tasks spawned by the binary.

pub mod session_reaper;
