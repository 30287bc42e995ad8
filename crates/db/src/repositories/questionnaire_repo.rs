//! Repository for the `questionnaires` table.

use rms_core::pagination::ListQuery;
use rms_core::types::DbId;
use sqlx::PgPool;

use crate::models::questionnaire::{CreateQuestionnaire, Questionnaire, UpdateQuestionnaire};

const COLUMNS: &str =
    "id, name, description, template_url, is_deleted, created_by, created_at, updated_at";

/// `sort` parameter names mapped to SQL columns.
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "name"),
    ("createdAt", "created_at"),
    ("updatedAt", "updated_at"),
];

const SEARCH_FILTER: &str =
    "is_deleted = false AND ($1::TEXT IS NULL OR name ILIKE $1 OR description ILIKE $1)";

pub struct QuestionnaireRepo;

impl QuestionnaireRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateQuestionnaire,
    ) -> Result<Questionnaire, sqlx::Error> {
        let query = format!(
            "INSERT INTO questionnaires (name, description, template_url, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Questionnaire>(&query)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_deref())
            .bind(&input.template_url)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Questionnaire>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM questionnaires WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Questionnaire>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn search(
        pool: &PgPool,
        params: &ListQuery,
    ) -> Result<Vec<Questionnaire>, sqlx::Error> {
        let order = params.order_by(SORT_COLUMNS, "name ASC");
        let query = format!(
            "SELECT {COLUMNS} FROM questionnaires WHERE {SEARCH_FILTER} \
             ORDER BY {order} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Questionnaire>(&query)
            .bind(params.search_pattern())
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*)::BIGINT FROM questionnaires WHERE {SEARCH_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.search_pattern())
            .fetch_one(pool)
            .await
    }

    /// Every live questionnaire by name, for select options.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Questionnaire>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM questionnaires WHERE is_deleted = false ORDER BY name");
        sqlx::query_as::<_, Questionnaire>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateQuestionnaire,
    ) -> Result<Option<Questionnaire>, sqlx::Error> {
        let query = format!(
            "UPDATE questionnaires SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                template_url = COALESCE($5, template_url)
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Questionnaire>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.description.is_some())
            .bind(input.description.as_ref().and_then(Option::as_deref))
            .bind(&input.template_url)
            .fetch_optional(pool)
            .await
    }

    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE questionnaires SET is_deleted = true WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
