//! Rating model and DTOs.

use chrono::NaiveDate;
use rms_core::questionnaire::QuestionRecord;
use rms_core::rating::RatingActors;
use rms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::nullable;
use crate::models::status::StatusId;

/// A row from the `ratings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: DbId,
    pub client_id: DbId,
    pub methodology_id: Option<DbId>,
    pub questionnaire_id: Option<DbId>,
    pub status_id: StatusId,
    pub rating_year: i32,
    pub rating_score: Option<String>,
    pub outlook: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub supervisor_id: Option<DbId>,
    pub primary_analyst_id: Option<DbId>,
    pub secondary_analyst_id: Option<DbId>,
    pub questions: Json<Vec<QuestionRecord>>,
    pub is_deleted: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rating {
    pub fn actors(&self) -> RatingActors {
        RatingActors {
            supervisor_id: self.supervisor_id,
            primary_analyst_id: self.primary_analyst_id,
            secondary_analyst_id: self.secondary_analyst_id,
        }
    }
}

/// List row: a rating with client and status names resolved.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRow {
    pub id: DbId,
    pub client_id: DbId,
    pub company_name: String,
    pub rating_year: i32,
    pub status_id: StatusId,
    pub status_name: String,
    pub rating_score: Option<String>,
    pub outlook: Option<String>,
    pub updated_at: Timestamp,
}

/// DTO for creating a rating. `questions` is instantiated from the
/// questionnaire template by the handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRating {
    pub client_id: DbId,
    pub methodology_id: Option<DbId>,
    pub questionnaire_id: Option<DbId>,
    /// Defaults to 1 (Pending) if omitted.
    pub status_id: Option<StatusId>,
    pub rating_year: i32,
    pub rating_score: Option<String>,
    pub outlook: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub supervisor_id: Option<DbId>,
    pub primary_analyst_id: Option<DbId>,
    pub secondary_analyst_id: Option<DbId>,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
    #[serde(default)]
    pub created_by: Option<DbId>,
}

/// DTO for updating an existing rating. All fields are optional;
/// `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRating {
    pub client_id: Option<DbId>,
    #[serde(default, deserialize_with = "nullable")]
    pub methodology_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub questionnaire_id: Option<Option<DbId>>,
    pub status_id: Option<StatusId>,
    pub rating_year: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub rating_score: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub outlook: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub supervisor_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub primary_analyst_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "nullable")]
    pub secondary_analyst_id: Option<Option<DbId>>,
}
