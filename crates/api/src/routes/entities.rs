//! Route definitions for the staff-managed reference entities: `/users`,
//! `/industries`, `/methodologies` and `/questionnaires`.
//!
//! Each entity gets the same shape:
//!
//! ```text
//! GET    /            -> list
//! POST   /            -> create
//! GET    /form        -> new_form
//! GET    /{id}        -> get_by_id
//! PATCH  /{id}        -> update
//! DELETE /{id}        -> delete
//! GET    /{id}/form   -> edit_form
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::{industry, methodology, questionnaire, user};
use crate::state::AppState;

/// Build the CRUD router of one handler module.
macro_rules! crud_router {
    ($handlers:ident) => {
        Router::new()
            .route("/", get($handlers::list).post($handlers::create))
            .route("/form", get($handlers::new_form))
            .route(
                "/{id}",
                get($handlers::get_by_id)
                    .patch($handlers::update)
                    .delete($handlers::delete),
            )
            .route("/{id}/form", get($handlers::edit_form))
    };
}

/// Staff accounts (admin only), mounted at `/users`.
pub fn users_router() -> Router<AppState> {
    crud_router!(user)
}

/// Mounted at `/industries`.
pub fn industries_router() -> Router<AppState> {
    crud_router!(industry)
}

/// Mounted at `/methodologies`.
pub fn methodologies_router() -> Router<AppState> {
    crud_router!(methodology)
}

/// Mounted at `/questionnaires`.
pub fn questionnaires_router() -> Router<AppState> {
    crud_router!(questionnaire)
}
