//! Route definitions for the `/clients` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::client;
use crate::state::AppState;

/// Routes mounted at `/clients`.
///
/// ```text
/// GET    /                -> list
/// POST   /                -> create
/// GET    /form?logins=n   -> new_form
/// GET    /{id}            -> get_by_id
/// PATCH  /{id}            -> update
/// DELETE /{id}            -> delete
/// GET    /{id}/form       -> edit_form
/// GET    /{id}/logins     -> list_logins
/// POST   /{id}/logins     -> add_login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(client::list).post(client::create))
        .route("/form", get(client::new_form))
        .route(
            "/{id}",
            get(client::get_by_id)
                .patch(client::update)
                .delete(client::delete),
        )
        .route("/{id}/form", get(client::edit_form))
        .route(
            "/{id}/logins",
            get(client::list_logins).post(client::add_login),
        )
}
