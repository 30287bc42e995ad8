//! First-run admin account.

use rms_core::roles::ROLE_ADMIN;
use rms_db::models::user::CreateUser;
use rms_db::repositories::UserRepo;
use rms_db::DbPool;

use super::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("ADMIN_PASSWORD rejected: {0}")]
    WeakPassword(String),
    #[error("Password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Create an active admin with `email` unless a user with that email exists.
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(pool: &DbPool, email: &str, password: &str) -> Result<bool, BootstrapError> {
    let email = email.trim().to_lowercase();
    if UserRepo::find_by_email(pool, &email).await?.is_some() {
        return Ok(false);
    }

    validate_password_strength(password, MIN_PASSWORD_LENGTH).map_err(BootstrapError::WeakPassword)?;
    let password_hash = hash_password(password).map_err(|e| BootstrapError::Hash(e.to_string()))?;

    let admin = UserRepo::create(
        pool,
        &CreateUser {
            first_name: "System".into(),
            last_name: "Administrator".into(),
            email,
            password_hash,
            role: Some(ROLE_ADMIN.into()),
            is_active: Some(true),
        },
    )
    .await?;
    tracing::info!(user_id = admin.id, email = %admin.email, "Bootstrap admin created");
    Ok(true)
}
