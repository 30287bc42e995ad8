//! Well-known role and principal-kind constants.
//!
//! Staff roles must match the `CHECK` constraint on `users.role` in
//! `20260301000001_create_core_tables.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ANALYST: &str = "analyst";

/// Every role a staff account may hold.
pub const STAFF_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ANALYST];

/// Principal kind carried in session tokens for internal staff.
pub const KIND_STAFF: &str = "user";

/// Principal kind carried in session tokens for external clients.
pub const KIND_CLIENT: &str = "client";

/// Check whether `role` names a known staff role.
pub fn is_staff_role(role: &str) -> bool {
    STAFF_ROLES.contains(&role)
}
