//! Files attached to a rating (invoices, receipts, documents).

use rms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rating_documents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDocument {
    pub id: DbId,
    pub rating_id: DbId,
    /// `invoice`, `receipt`, `document` or `question`.
    pub kind: String,
    pub file_name: String,
    pub object_key: String,
    pub url: String,
    pub size_bytes: i64,
    pub uploaded_by_user: Option<DbId>,
    pub uploaded_by_client: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateRatingDocument {
    pub rating_id: DbId,
    pub kind: String,
    pub file_name: String,
    pub object_key: String,
    pub url: String,
    pub size_bytes: i64,
    pub uploaded_by_user: Option<DbId>,
    pub uploaded_by_client: Option<DbId>,
}
