//! Repository for the `ratings` table.

use rms_core::pagination::ListQuery;
use rms_core::questionnaire::{apply_response, QuestionRecord, ResponseUpdate};
use rms_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::rating::{CreateRating, Rating, RatingRow, UpdateRating};
use crate::models::status::RatingStatus;

const COLUMNS: &str = "id, client_id, methodology_id, questionnaire_id, status_id, rating_year, \
                       rating_score, outlook, start_date, end_date, supervisor_id, \
                       primary_analyst_id, secondary_analyst_id, questions, is_deleted, \
                       created_by, created_at, updated_at";

const ROW_COLUMNS: &str = "r.id, r.client_id, c.company_name, r.rating_year, r.status_id, \
                           s.name AS status_name, r.rating_score, r.outlook, r.updated_at";

const ROW_FROM: &str = "ratings r \
                        JOIN clients c ON c.id = r.client_id \
                        JOIN rating_statuses s ON s.id = r.status_id";

/// `sort` parameter names mapped to SQL columns.
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("companyName", "c.company_name"),
    ("ratingYear", "r.rating_year"),
    ("statusName", "r.status_id"),
    ("updatedAt", "r.updated_at"),
];

const DEFAULT_ORDER: &str = "r.updated_at DESC";

/// Result of recording a questionnaire response.
#[derive(Debug)]
pub enum RespondOutcome {
    Updated(Vec<QuestionRecord>),
    RatingNotFound,
    UnknownQuestion,
}

/// Provides CRUD operations for ratings.
pub struct RatingRepo;

impl RatingRepo {
    /// Insert a new rating, returning the created row.
    ///
    /// If `status_id` is `None` in the input, defaults to Pending.
    pub async fn create(pool: &PgPool, input: &CreateRating) -> Result<Rating, sqlx::Error> {
        let query = format!(
            "INSERT INTO ratings
                (client_id, methodology_id, questionnaire_id, status_id, rating_year,
                 rating_score, outlook, start_date, end_date, supervisor_id,
                 primary_analyst_id, secondary_analyst_id, questions, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(input.client_id)
            .bind(input.methodology_id)
            .bind(input.questionnaire_id)
            .bind(input.status_id.unwrap_or(RatingStatus::Pending.id()))
            .bind(input.rating_year)
            .bind(&input.rating_score)
            .bind(&input.outlook)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.supervisor_id)
            .bind(input.primary_analyst_id)
            .bind(input.secondary_analyst_id)
            .bind(Json(&input.questions))
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a rating by internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ratings WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a rating owned by `client_id`. Ratings of other clients are
    /// indistinguishable from missing ones.
    pub async fn find_for_client(
        pool: &PgPool,
        id: DbId,
        client_id: DbId,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ratings \
             WHERE id = $1 AND client_id = $2 AND is_deleted = false"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// One page of ratings, optionally restricted to one client.
    pub async fn search(
        pool: &PgPool,
        params: &ListQuery,
        client_id: Option<DbId>,
    ) -> Result<Vec<RatingRow>, sqlx::Error> {
        let (where_clause, bind_idx) = build_rating_filter(client_id);
        let order = params.order_by(SORT_COLUMNS, DEFAULT_ORDER);
        let query = format!(
            "SELECT {ROW_COLUMNS} FROM {ROW_FROM} {where_clause} \
             ORDER BY {order} LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );
        let mut q = sqlx::query_as::<_, RatingRow>(&query).bind(params.search_pattern());
        if let Some(client_id) = client_id {
            q = q.bind(client_id);
        }
        q.bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await
    }

    /// Count ratings matching the query (for pagination metadata).
    pub async fn count(
        pool: &PgPool,
        params: &ListQuery,
        client_id: Option<DbId>,
    ) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = build_rating_filter(client_id);
        let query = format!("SELECT COUNT(*)::BIGINT FROM {ROW_FROM} {where_clause}");
        let mut q = sqlx::query_scalar::<_, i64>(&query).bind(params.search_pattern());
        if let Some(client_id) = client_id {
            q = q.bind(client_id);
        }
        q.fetch_one(pool).await
    }

    /// Update a rating. `None` fields are kept; `Some(None)` clears a nullable
    /// column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRating,
    ) -> Result<Option<Rating>, sqlx::Error> {
        let query = format!(
            "UPDATE ratings SET
                client_id = COALESCE($2, client_id),
                status_id = COALESCE($3, status_id),
                rating_year = COALESCE($4, rating_year),
                methodology_id = CASE WHEN $5 THEN $6 ELSE methodology_id END,
                questionnaire_id = CASE WHEN $7 THEN $8 ELSE questionnaire_id END,
                rating_score = CASE WHEN $9 THEN $10 ELSE rating_score END,
                outlook = CASE WHEN $11 THEN $12 ELSE outlook END,
                start_date = CASE WHEN $13 THEN $14 ELSE start_date END,
                end_date = CASE WHEN $15 THEN $16 ELSE end_date END,
                supervisor_id = CASE WHEN $17 THEN $18 ELSE supervisor_id END,
                primary_analyst_id = CASE WHEN $19 THEN $20 ELSE primary_analyst_id END,
                secondary_analyst_id = CASE WHEN $21 THEN $22 ELSE secondary_analyst_id END
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rating>(&query)
            .bind(id)
            .bind(input.client_id)
            .bind(input.status_id)
            .bind(input.rating_year)
            .bind(input.methodology_id.is_some())
            .bind(input.methodology_id.flatten())
            .bind(input.questionnaire_id.is_some())
            .bind(input.questionnaire_id.flatten())
            .bind(input.rating_score.is_some())
            .bind(input.rating_score.as_ref().and_then(Option::as_deref))
            .bind(input.outlook.is_some())
            .bind(input.outlook.as_ref().and_then(Option::as_deref))
            .bind(input.start_date.is_some())
            .bind(input.start_date.flatten())
            .bind(input.end_date.is_some())
            .bind(input.end_date.flatten())
            .bind(input.supervisor_id.is_some())
            .bind(input.supervisor_id.flatten())
            .bind(input.primary_analyst_id.is_some())
            .bind(input.primary_analyst_id.flatten())
            .bind(input.secondary_analyst_id.is_some())
            .bind(input.secondary_analyst_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the response to one question.
    ///
    /// The question list is read `FOR UPDATE` and written back in the same
    /// transaction so concurrent responders never lose each other's answers.
    /// With `client_id` set, only that client's ratings are considered.
    pub async fn respond(
        pool: &PgPool,
        id: DbId,
        client_id: Option<DbId>,
        question: &str,
        update: ResponseUpdate,
    ) -> Result<RespondOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_scalar::<_, Json<Vec<QuestionRecord>>>(
            "SELECT questions FROM ratings
             WHERE id = $1 AND is_deleted = false AND ($2::BIGINT IS NULL OR client_id = $2)
             FOR UPDATE",
        )
        .bind(id)
        .bind(client_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(Json(mut questions)) = current else {
            return Ok(RespondOutcome::RatingNotFound);
        };
        if apply_response(&mut questions, question, update).is_err() {
            return Ok(RespondOutcome::UnknownQuestion);
        }

        sqlx::query("UPDATE ratings SET questions = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(&questions))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RespondOutcome::Updated(questions))
    }

    /// Soft-delete a rating. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE ratings SET is_deleted = true WHERE id = $1 AND is_deleted = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Build the WHERE clause of rating list queries. `$1` is always the search
/// pattern.
///
/// Returns `(where_clause, next_bind_index)`.
fn build_rating_filter(client_id: Option<DbId>) -> (String, u32) {
    let mut conditions = vec![
        "r.is_deleted = false".to_string(),
        "($1::TEXT IS NULL OR c.company_name ILIKE $1 OR r.rating_score ILIKE $1 \
         OR s.name ILIKE $1 OR r.rating_year::TEXT ILIKE $1)"
            .to_string(),
    ];
    let mut bind_idx = 2u32;

    if client_id.is_some() {
        conditions.push(format!("r.client_id = ${bind_idx}"));
        bind_idx += 1;
    }

    (format!("WHERE {}", conditions.join(" AND ")), bind_idx)
}
