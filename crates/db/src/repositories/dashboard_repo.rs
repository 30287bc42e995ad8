//! Aggregate counts for the staff dashboard.

use sqlx::PgPool;

use crate::models::dashboard::{DashboardCounts, StatusCount};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Read every dashboard count inside one transaction so the numbers are
    /// mutually consistent.
    pub async fn counts(pool: &PgPool) -> Result<DashboardCounts, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let mut totals = [0i64; 5];
        for (slot, table) in totals.iter_mut().zip([
            "clients",
            "ratings",
            "industries",
            "methodologies",
            "questionnaires",
        ]) {
            *slot = sqlx::query_scalar::<_, i64>(&format!(
                "SELECT COUNT(*)::BIGINT FROM {table} WHERE is_deleted = false"
            ))
            .fetch_one(&mut *tx)
            .await?;
        }

        let ratings_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT s.id AS status_id, s.name, COUNT(r.id)::BIGINT AS count
             FROM rating_statuses s
             LEFT JOIN ratings r ON r.status_id = s.id AND r.is_deleted = false
             GROUP BY s.id, s.name
             ORDER BY s.id",
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let [clients, ratings, industries, methodologies, questionnaires] = totals;
        Ok(DashboardCounts {
            clients,
            ratings,
            industries,
            methodologies,
            questionnaires,
            ratings_by_status,
        })
    }
}
