//! Client (rated company) model and DTOs.

use rms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::nullable;

/// A row from the `clients` table. The password hash is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: DbId,
    pub company_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub industry_id: Option<DbId>,
    pub is_deleted: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// List row: a client with its industry name resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRow {
    pub id: DbId,
    pub company_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub contact_person: Option<String>,
    pub industry_name: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a client. `password_hash` is filled in by the handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClient {
    pub company_name: String,
    pub email: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub industry_id: Option<DbId>,
    #[serde(default)]
    pub created_by: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClient {
    pub company_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub contact_person: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub industry_id: Option<Option<DbId>>,
}
