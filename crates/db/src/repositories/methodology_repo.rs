//! Repository for the `methodologies` table.

use rms_core::pagination::ListQuery;
use rms_core::types::DbId;
use sqlx::PgPool;

use crate::models::methodology::{
    CreateMethodology, Methodology, MethodologyRow, UpdateMethodology,
};

const COLUMNS: &str = "id, name, description, industry_id, document_url, is_deleted, \
                       created_by, created_at, updated_at";

const ROW_COLUMNS: &str = "m.id, m.name, i.name AS industry_name, m.document_url, m.updated_at";

/// `sort` parameter names mapped to SQL columns.
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "m.name"),
    ("industryName", "i.name"),
    ("updatedAt", "m.updated_at"),
];

const SEARCH_FILTER: &str =
    "m.is_deleted = false AND ($1::TEXT IS NULL OR m.name ILIKE $1 OR i.name ILIKE $1)";

pub struct MethodologyRepo;

impl MethodologyRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateMethodology,
    ) -> Result<Methodology, sqlx::Error> {
        let query = format!(
            "INSERT INTO methodologies (name, description, industry_id, document_url, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Methodology>(&query)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_deref())
            .bind(input.industry_id.is_some())
            .bind(input.industry_id)
            .bind(input.document_url.is_some())
            .bind(input.document_url.as_deref())
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Methodology>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM methodologies WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Methodology>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn search(
        pool: &PgPool,
        params: &ListQuery,
    ) -> Result<Vec<MethodologyRow>, sqlx::Error> {
        let order = params.order_by(SORT_COLUMNS, "m.name ASC");
        let query = format!(
            "SELECT {ROW_COLUMNS} FROM methodologies m \
             LEFT JOIN industries i ON i.id = m.industry_id \
             WHERE {SEARCH_FILTER} ORDER BY {order} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, MethodologyRow>(&query)
            .bind(params.search_pattern())
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM methodologies m \
             LEFT JOIN industries i ON i.id = m.industry_id WHERE {SEARCH_FILTER}"
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.search_pattern())
            .fetch_one(pool)
            .await
    }

    /// Every live methodology by name, for select options.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Methodology>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM methodologies WHERE is_deleted = false ORDER BY name");
        sqlx::query_as::<_, Methodology>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMethodology,
    ) -> Result<Option<Methodology>, sqlx::Error> {
        let query = format!(
            "UPDATE methodologies SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                industry_id = CASE WHEN $5 THEN $6 ELSE industry_id END,
                document_url = CASE WHEN $7 THEN $8 ELSE document_url END
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Methodology>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .bind(input.industry_id.is_some())
            .bind(input.industry_id.flatten())
            .bind(input.document_url.is_some())
            .bind(input.document_url.as_ref().and_then(Option::as_deref))
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE methodologies SET is_deleted = true WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
