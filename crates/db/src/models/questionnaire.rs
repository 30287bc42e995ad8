//! Questionnaire model and DTOs.
//!
//! A questionnaire points at a JSON template; ratings copy its questions at
//! creation time so later template edits never rewrite existing answers.

use rms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::nullable;

/// A row from the `questionnaires` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub template_url: String,
    pub is_deleted: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionnaire {
    pub name: String,
    pub description: Option<String>,
    pub template_url: String,
    #[serde(default)]
    pub created_by: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionnaire {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub template_url: Option<String>,
}
