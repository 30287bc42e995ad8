//! Repository for the `clients` table.

use rms_core::pagination::ListQuery;
use rms_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, ClientRow, CreateClient, UpdateClient};

const COLUMNS: &str = "id, company_name, email, password_hash, phone, address, contact_person, \
                       industry_id, is_deleted, created_by, created_at, updated_at";

const ROW_COLUMNS: &str = "c.id, c.company_name, c.email, c.phone, c.contact_person, \
                           i.name AS industry_name, c.created_at";

/// `sort` parameter names mapped to SQL columns.
pub const SORT_COLUMNS: &[(&str, &str)] = &[
    ("companyName", "c.company_name"),
    ("email", "c.email"),
    ("industryName", "i.name"),
    ("createdAt", "c.created_at"),
];

const SEARCH_FILTER: &str = "c.is_deleted = false AND ($1::TEXT IS NULL \
                             OR c.company_name ILIKE $1 OR c.email ILIKE $1 \
                             OR c.contact_person ILIKE $1)";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a new client, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients
                (company_name, email, password_hash, phone, address, contact_person,
                 industry_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.phone.is_some())
            .bind(input.phone.as_deref())
            .bind(input.address.is_some())
            .bind(input.address.as_deref())
            .bind(input.contact_person.is_some())
            .bind(input.contact_person.as_deref())
            .bind(input.industry_id.is_some())
            .bind(input.industry_id)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a client by internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live client by its primary email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Client>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM clients WHERE email = $1 AND is_deleted = false");
        sqlx::query_as::<_, Client>(&query)
            .bind(email.to_lowercase())
            .fetch_optional(pool)
            .await
    }

    /// One page of clients matching the query.
    pub async fn search(pool: &PgPool, params: &ListQuery) -> Result<Vec<ClientRow>, sqlx::Error> {
        let order = params.order_by(SORT_COLUMNS, "c.created_at DESC");
        let query = format!(
            "SELECT {ROW_COLUMNS} FROM clients c \
             LEFT JOIN industries i ON i.id = c.industry_id \
             WHERE {SEARCH_FILTER} ORDER BY {order} LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, ClientRow>(&query)
            .bind(params.search_pattern())
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(pool)
            .await
    }

    /// Count clients matching the query (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &ListQuery) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM clients c \
             LEFT JOIN industries i ON i.id = c.industry_id WHERE {SEARCH_FILTER}"
        );
        sqlx::query_scalar::<_, i64>(&query)
            .bind(params.search_pattern())
            .fetch_one(pool)
            .await
    }

    /// Every live client by name, for select options.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Client>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM clients WHERE is_deleted = false ORDER BY company_name"
        );
        sqlx::query_as::<_, Client>(&query).fetch_all(pool).await
    }

    /// Primary email plus every additional login email of a client.
    pub async fn contact_emails(pool: &PgPool, id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT email FROM clients WHERE id = $1 AND is_deleted = false
             UNION
             SELECT l.email FROM client_logins l
             JOIN clients c ON c.id = l.client_id
             WHERE l.client_id = $1 AND c.is_deleted = false
             ORDER BY 1",
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                company_name = COALESCE($2, company_name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                phone = CASE WHEN $5 THEN $6 ELSE phone END,
                address = CASE WHEN $7 THEN $8 ELSE address END,
                contact_person = CASE WHEN $9 THEN $10 ELSE contact_person END,
                industry_id = CASE WHEN $11 THEN $12 ELSE industry_id END
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(input.phone.is_some())
            .bind(input.phone.as_ref().and_then(Option::as_deref))
            .bind(input.address.is_some())
            .bind(input.address.as_ref().and_then(Option::as_deref))
            .bind(input.contact_person.is_some())
            .bind(input.contact_person.as_ref().and_then(Option::as_deref))
            .bind(input.industry_id.is_some())
            .bind(input.industry_id.flatten())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a client. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE clients SET is_deleted = true WHERE id = $1 AND is_deleted = false")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
