//! Additional login credentials of a client.

use rms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `client_logins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientLogin {
    pub id: DbId,
    pub client_id: DbId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateClientLogin {
    pub client_id: DbId,
    pub email: String,
    pub password_hash: String,
}
