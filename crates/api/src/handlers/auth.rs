//! Handlers for the `/auth` resource (staff login, client login, logout, me).

use axum::extract::State;
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use rms_core::error::CoreError;
use rms_core::notice::Notice;
use rms_db::repositories::{ClientLoginRepo, ClientRepo, UserRepo};
use serde::Deserialize;

use crate::auth::jwt::issue_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSession;
use crate::response::{ActionResponse, DataResponse};
use crate::session::cookie::{expired_session_cookie, session_cookie, Principal, SessionPayload};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Form body of both login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    fn normalized_email(&self) -> String {
        self.email.trim().to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate a staff member. Sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<LoginForm>,
) -> AppResult<(CookieJar, Json<ActionResponse<Principal>>)> {
    let user = UserRepo::find_by_email(&state.pool, &input.normalized_email())
        .await?
        .ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    if !check_password(&input.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Staff login rejected");
        return Err(invalid_credentials());
    }

    UserRepo::touch_last_login(&state.pool, user.id).await?;

    let principal = Principal::User {
        id: user.id,
        name: user.full_name(),
        email: user.email.clone(),
        role: user.role.clone(),
    };
    let jar = start_session(&state, jar, principal.clone()).await?;
    tracing::info!(user_id = user.id, role = %user.role, "Staff signed in");

    Ok((jar, Json(ActionResponse::ok("Signed in", principal))))
}

/// POST /api/v1/auth/client-login
///
/// Authenticate a client with its primary credentials or one of its
/// additional logins. Sets the session cookie.
pub async fn client_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(input): Form<LoginForm>,
) -> AppResult<(CookieJar, Json<ActionResponse<Principal>>)> {
    let email = input.normalized_email();

    let mut principal = None;
    if let Some(client) = ClientRepo::find_by_email(&state.pool, &email).await? {
        if let Some(hash) = client.password_hash.as_deref() {
            if check_password(&input.password, hash)? {
                principal = Some(Principal::Client {
                    client_id: client.id,
                    login_id: None,
                    company_name: client.company_name,
                    email: client.email,
                });
            }
        }
    }

    if principal.is_none() {
        if let Some(login) = ClientLoginRepo::find_by_email(&state.pool, &email).await? {
            if check_password(&input.password, &login.password_hash)? {
                let client = ClientRepo::find_by_id(&state.pool, login.client_id)
                    .await?
                    .ok_or_else(invalid_credentials)?;
                principal = Some(Principal::Client {
                    client_id: client.id,
                    login_id: Some(login.id),
                    company_name: client.company_name,
                    email: login.email,
                });
            }
        }
    }

    let principal = principal.ok_or_else(|| {
        tracing::info!("Client login rejected");
        invalid_credentials()
    })?;
    let jar = start_session(&state, jar, principal.clone()).await?;
    tracing::info!(client_id = principal.subject(), "Client signed in");

    Ok((jar, Json(ActionResponse::ok("Signed in", principal))))
}

/// POST /api/v1/auth/logout
///
/// Drop the server-side session, refuse its token from now on, and clear the
/// cookie.
pub async fn logout(
    State(state): State<AppState>,
    session: AuthSession,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<ActionResponse<()>>)> {
    state.sessions.revoke(&session.claims).await;
    tracing::info!(kind = %session.claims.kind, sub = session.claims.sub, "Signed out");
    Ok((
        jar.add(expired_session_cookie()),
        Json(ActionResponse::done("Signed out")),
    ))
}

/// GET /api/v1/auth/me
pub async fn me(session: AuthSession) -> Json<DataResponse<Principal>> {
    Json(DataResponse {
        data: session.principal,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

fn check_password(password: &str, hash: &str) -> AppResult<bool> {
    verify_password(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))
}

/// Issue a token for `principal`, open its server-side session and add the
/// sealed session cookie to `jar`.
async fn start_session(
    state: &AppState,
    jar: CookieJar,
    principal: Principal,
) -> AppResult<CookieJar> {
    let (token, claims) = issue_token(
        principal.subject(),
        principal.kind(),
        principal.role(),
        &state.config.jwt,
    )
    .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let sealed = state.cipher.seal_json(&SessionPayload { token, principal })?;
    state
        .sessions
        .notify(&claims, Notice::success("auth-login", "Welcome back"))
        .await;

    Ok(jar.add(session_cookie(sealed, &state.config.session)))
}
