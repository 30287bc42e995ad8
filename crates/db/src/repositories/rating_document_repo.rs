//! Repository for the `rating_documents` table.

use rms_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::rating_document::{CreateRatingDocument, RatingDocument};

const COLUMNS: &str = "id, rating_id, kind, file_name, object_key, url, size_bytes, \
                       uploaded_by_user, uploaded_by_client, created_at";

pub struct RatingDocumentRepo;

impl RatingDocumentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateRatingDocument,
    ) -> Result<RatingDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO rating_documents
                (rating_id, kind, file_name, object_key, url, size_bytes,
                 uploaded_by_user, uploaded_by_client)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RatingDocument>(&query)
            .bind(input.rating_id)
            .bind(&input.kind)
            .bind(&input.file_name)
            .bind(&input.object_key)
            .bind(&input.url)
            .bind(input.size_bytes)
            .bind(input.uploaded_by_user)
            .bind(input.uploaded_by_client)
            .fetch_one(pool)
            .await
    }

    /// Find a document of `rating_id`.
    pub async fn find(
        pool: &PgPool,
        rating_id: DbId,
        id: DbId,
    ) -> Result<Option<RatingDocument>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM rating_documents WHERE id = $1 AND rating_id = $2");
        sqlx::query_as::<_, RatingDocument>(&query)
            .bind(id)
            .bind(rating_id)
            .fetch_optional(pool)
            .await
    }

    /// Documents of a rating, newest first, optionally of one kind only.
    pub async fn list_by_rating(
        pool: &PgPool,
        rating_id: DbId,
        kind: Option<&str>,
    ) -> Result<Vec<RatingDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rating_documents \
             WHERE rating_id = $1 AND ($2::TEXT IS NULL OR kind = $2) \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, RatingDocument>(&query)
            .bind(rating_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    /// Whether a document row already points at `object_key`.
    pub async fn key_exists(pool: &PgPool, object_key: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM rating_documents WHERE object_key = $1)",
        )
        .bind(object_key)
        .fetch_one(pool)
        .await
    }

    /// Permanently delete a document row. Returns `true` if a row was removed.
    ///
    /// Takes any executor so the caller can hold the delete in a transaction
    /// until the stored object is gone.
    pub async fn delete<'e, E>(executor: E, rating_id: DbId, id: DbId) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM rating_documents WHERE id = $1 AND rating_id = $2")
            .bind(id)
            .bind(rating_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
