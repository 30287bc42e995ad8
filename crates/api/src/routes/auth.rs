//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login         -> login (staff)
/// POST /client-login  -> client_login
/// POST /logout        -> logout
/// GET  /me            -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/client-login", post(auth::client_login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}
