//! Browser sessions.
//!
//! - [`cookie`] -- session/settings cookie payloads and builders.
//! - [`registry`] -- per-session list caches and notice boards.

pub mod cookie;
pub mod registry;
