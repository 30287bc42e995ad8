//! Route definitions for the `/ratings` resource.
//!
//! Also nests the questionnaire and document routes of a rating. Upload
//! routes carry a raised body limit; the per-kind cap is enforced while the
//! file is spooled.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{document, rating, rating_questionnaire};
use crate::multipart::upload_body_limit;
use crate::state::AppState;

/// Routes mounted at `/ratings`.
///
/// ```text
/// GET    /                                     -> list
/// POST   /                                     -> create
/// GET    /form                                 -> new_form
/// GET    /{id}                                 -> get_by_id
/// PATCH  /{id}                                 -> update
/// DELETE /{id}                                 -> delete
/// GET    /{id}/form                            -> edit_form
///
/// GET    /{id}/questionnaire                   -> rating_questionnaire::view
/// POST   /{id}/questionnaire/responses         -> rating_questionnaire::respond
/// POST   /{id}/questionnaire/upload            -> rating_questionnaire::upload
///
/// GET    /{id}/documents                       -> document::list
/// POST   /{id}/documents/{kind}                -> document::upload
/// DELETE /{id}/documents/{doc_id}              -> document::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rating::list).post(rating::create))
        .route("/form", get(rating::new_form))
        .route(
            "/{id}",
            get(rating::get_by_id)
                .patch(rating::update)
                .delete(rating::delete),
        )
        .route("/{id}/form", get(rating::edit_form))
        .route("/{id}/questionnaire", get(rating_questionnaire::view))
        .route(
            "/{id}/questionnaire/responses",
            post(rating_questionnaire::respond),
        )
        .route(
            "/{id}/questionnaire/upload",
            post(rating_questionnaire::upload).layer(upload_body_limit()),
        )
        .route("/{id}/documents", get(document::list))
        // One segment name for both: the router rejects sibling parameters
        // with different names.
        .route(
            "/{id}/documents/{item}",
            post(document::upload)
                .layer(upload_body_limit())
                .delete(document::delete),
        )
}
