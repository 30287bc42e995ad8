//! Cookie-session extractors for Axum handlers.
//!
//! [`AuthSession`] opens the sealed session cookie and validates the token
//! inside it. [`StaffUser`] and [`ClientUser`] narrow it to one principal
//! kind. A missing, tampered, expired or logged-out session redirects to `/`
//! and clears the cookie. So does a session whose principal was deactivated,
//! deleted or had its role changed since the cookie was issued.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use rms_core::error::CoreError;
use rms_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::session::cookie::{Principal, SessionPayload, SESSION_COOKIE};
use crate::state::AppState;

/// Any signed-in session, staff or client.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: Claims,
    pub principal: Principal,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let sealed = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(AppError::session_required)?;

        let payload: SessionPayload = state.cipher.open_json(&sealed).map_err(|_| {
            tracing::debug!("Rejected unreadable session cookie");
            AppError::session_required()
        })?;

        let claims = validate_token(&payload.token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::session_required()
        })?;

        if claims.kind != payload.principal.kind()
            || claims.sub != payload.principal.subject()
            || state.sessions.is_revoked(&claims).await
        {
            return Err(AppError::session_required());
        }

        Ok(AuthSession {
            claims,
            principal: payload.principal,
        })
    }
}

/// A signed-in staff member.
///
/// ```ignore
/// async fn my_handler(staff: StaffUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = staff.user_id, role = %staff.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StaffUser {
    pub user_id: DbId,
    pub role: String,
    pub name: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        match session.principal {
            Principal::User { id, name, role, .. } => Ok(StaffUser {
                user_id: id,
                role,
                name,
                claims: session.claims,
            }),
            Principal::Client { .. } => Err(AppError::Core(CoreError::Forbidden(
                "Staff access required".into(),
            ))),
        }
    }
}

/// A signed-in client. Only ever sees its own ratings.
#[derive(Debug, Clone)]
pub struct ClientUser {
    pub client_id: DbId,
    pub login_id: Option<DbId>,
    pub company_name: String,
    pub claims: Claims,
}

impl FromRequestParts<AppState> for ClientUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state).await?;
        match session.principal {
            Principal::Client {
                client_id,
                login_id,
                company_name,
                ..
            } => Ok(ClientUser {
                client_id,
                login_id,
                company_name,
                claims: session.claims,
            }),
            Principal::User { .. } => Err(AppError::Core(CoreError::Forbidden(
                "Client access required".into(),
            ))),
        }
    }
}
