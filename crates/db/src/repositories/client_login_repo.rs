//! Repository for the `client_logins` table.

use rms_core::types::DbId;
use sqlx::PgPool;

use crate::models::client_login::{ClientLogin, CreateClientLogin};

const COLUMNS: &str = "id, client_id, email, password_hash, created_at";

pub struct ClientLoginRepo;

impl ClientLoginRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateClientLogin,
    ) -> Result<ClientLogin, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_logins (client_id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClientLogin>(&query)
            .bind(input.client_id)
            .bind(input.email.to_lowercase())
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Insert several logins for one client atomically.
    pub async fn create_many(
        pool: &PgPool,
        inputs: &[CreateClientLogin],
    ) -> Result<Vec<ClientLogin>, sqlx::Error> {
        let query = format!(
            "INSERT INTO client_logins (client_id, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let login = sqlx::query_as::<_, ClientLogin>(&query)
                .bind(input.client_id)
                .bind(input.email.to_lowercase())
                .bind(&input.password_hash)
                .fetch_one(&mut *tx)
                .await?;
            created.push(login);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find a login of a live client by email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<ClientLogin>, sqlx::Error> {
        sqlx::query_as::<_, ClientLogin>(
            "SELECT l.id, l.client_id, l.email, l.password_hash, l.created_at
             FROM client_logins l
             JOIN clients c ON c.id = l.client_id
             WHERE l.email = $1 AND c.is_deleted = false",
        )
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<ClientLogin>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM client_logins WHERE client_id = $1 ORDER BY id");
        sqlx::query_as::<_, ClientLogin>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }
}
