//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token issuing and validation.
//! - [`bootstrap`] -- first-run admin account.

pub mod bootstrap;
pub mod jwt;
pub mod password;
