//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row, serialized with
//!   the camelCase keys the form renderer and the front end use
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches; columns
//!   that may be cleared use `Option<Option<T>>` through [`nullable`]

pub mod client;
pub mod client_login;
pub mod dashboard;
pub mod industry;
pub mod methodology;
pub mod questionnaire;
pub mod rating;
pub mod rating_document;
pub mod status;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserialize a clearable update field: absent stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(value))`.
///
/// Pair with `#[serde(default, deserialize_with = "nullable")]`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
