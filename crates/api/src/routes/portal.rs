//! Route definitions for the client portal.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// Routes mounted at `/portal`.
///
/// ```text
/// GET  /ratings                                  -> list
/// GET  /ratings/{id}                             -> get
/// GET  /ratings/{id}/questionnaire               -> questionnaire
/// POST /ratings/{id}/questionnaire/responses     -> respond
/// GET  /ratings/{id}/documents                   -> documents
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ratings", get(portal::list))
        .route("/ratings/{id}", get(portal::get))
        .route("/ratings/{id}/questionnaire", get(portal::questionnaire))
        .route(
            "/ratings/{id}/questionnaire/responses",
            post(portal::respond),
        )
        .route("/ratings/{id}/documents", get(portal::documents))
}
