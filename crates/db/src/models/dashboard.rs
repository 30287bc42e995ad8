//! Dashboard aggregates.

use serde::Serialize;
use sqlx::FromRow;

use crate::models::status::StatusId;

/// Number of live ratings in one workflow status.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status_id: StatusId,
    pub name: String,
    pub count: i64,
}

/// Entity counts shown on the staff dashboard, read in one transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub clients: i64,
    pub ratings: i64,
    pub industries: i64,
    pub methodologies: i64,
    pub questionnaires: i64,
    pub ratings_by_status: Vec<StatusCount>,
}
