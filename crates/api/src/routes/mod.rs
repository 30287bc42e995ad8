pub mod auth;
pub mod client;
pub mod entities;
pub mod health;
pub mod portal;
pub mod rating;
pub mod settings;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      staff login (public)
/// /auth/client-login                               client login (public)
/// /auth/logout                                     logout
/// /auth/me                                         current principal
///
/// /settings/theme                                  get, update (settings cookie)
/// /notices                                         drain pending notices
/// /dashboard                                       aggregate counts (staff)
///
/// /users                                           list, create (admin only)
/// /users/form, /users/{id}, /users/{id}/form       forms, get, update, delete
/// /industries/...                                  same shape (staff)
/// /methodologies/...                               same shape (staff)
/// /questionnaires/...                              same shape (staff)
///
/// /clients/...                                     same shape (staff)
/// /clients/{id}/logins                             list, add login credential
///
/// /ratings/...                                     same shape (staff)
/// /ratings/{id}/questionnaire                      section viewer
/// /ratings/{id}/questionnaire/responses            save a text response
/// /ratings/{id}/questionnaire/upload               attach a file (multipart)
/// /ratings/{id}/documents                          list documents
/// /ratings/{id}/documents/{kind}                   upload (multipart)
/// /ratings/{id}/documents/{doc_id}                 delete
///
/// /portal/ratings                                  own ratings (client)
/// /portal/ratings/{id}                             get
/// /portal/ratings/{id}/questionnaire               section viewer
/// /portal/ratings/{id}/questionnaire/responses     save a text response
/// /portal/ratings/{id}/documents                   list documents
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, client login, logout, me).
        .nest("/auth", auth::router())
        .nest("/settings", settings::router())
        .route("/notices", get(handlers::notices::drain))
        .route("/dashboard", get(handlers::dashboard::counts))
        // Staff-managed entities.
        .nest("/users", entities::users_router())
        .nest("/industries", entities::industries_router())
        .nest("/methodologies", entities::methodologies_router())
        .nest("/questionnaires", entities::questionnaires_router())
        .nest("/clients", client::router())
        .nest("/ratings", rating::router())
        // Client portal.
        .nest("/portal", portal::router())
}
