//! Authentication and authorization extractors.
//!
//! - [`auth::AuthSession`] -- any signed-in session.
//! - [`auth::StaffUser`] -- a staff session.
//! - [`auth::ClientUser`] -- a client session.
//! - [`rbac::RequireAdmin`] -- a staff session with the `admin` role.

pub mod auth;
pub mod rbac;
