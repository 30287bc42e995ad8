//! Repository for the `industries` table.

use rms_core::pagination::ListQuery;
use rms_core::types::DbId;
use sqlx::PgPool;

use crate::models::industry::{CreateIndustry, Industry, UpdateIndustry};

const COLUMNS: &str = "id, name, description, is_deleted, created_by, created_at, updated_at";

/// `sort` parameter names mapped to SQL columns.
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

const SEARCH_FILTER: &str = "is_deleted = false AND ($1::TEXT IS NULL OR name ILIKE $1)";

pub struct IndustryRepo;

impl IndustryRepo {
    pub async fn create(pool: &PgPool, input: &CreateIndustry) -> Result<Industry, sqlx::Error> {
        let query = format!(
            "INSERT INTO industries (name, description, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Industry>(&query)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_deref())
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Industry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM industries WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Industry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn search(pool: &PgPool, params: &ListQuery) -> Result<Vec<Industry>, sqlx::Error> {
        let order = params.order_by(SORT_COLUMNS, "name ASC");
        let query = format!(
            "SELECT {COLUMNS} FROM industries WHERE {SEARCH_FILTER} \
             ORDER BY {order} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Industry>(&query)
            .bind(params.search_pattern())
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM industries WHERE {SEARCH_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.search_pattern())
            .fetch_one(pool)
            .await
    }

    /// Every live industry by name, for select options.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Industry>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM industries WHERE is_deleted = false ORDER BY name");
        sqlx::query_as::<_, Industry>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateIndustry,
    ) -> Result<Option<Industry>, sqlx::Error> {
        let query = format!(
            "UPDATE industries SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Industry>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE industries SET is_deleted = true WHERE id = $1 AND is_deleted = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
