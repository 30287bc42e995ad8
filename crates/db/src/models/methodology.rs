//! Methodology model and DTOs.

use rms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::nullable;

/// A row from the `methodologies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Methodology {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub industry_id: Option<DbId>,
    pub document_url: Option<String>,
    pub is_deleted: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// List row: a methodology with its industry name resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodologyRow {
    pub id: DbId,
    pub name: String,
    pub industry_name: Option<String>,
    pub document_url: Option<String>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMethodology {
    pub name: String,
    pub description: Option<String>,
    pub industry_id: Option<DbId>,
    pub document_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMethodology {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub industry_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub document_url: Option<Option<String>>,
}
