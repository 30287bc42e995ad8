//! Client portal (`/portal`): a client's own ratings, their questionnaires
//! and documents.
//!
//! Every lookup is scoped to the signed-in client. A rating of another
//! client answers exactly like a missing one.

use axum::extract::{Path, Query, State};
use axum::{Form, Json};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::questionnaire::{QuestionRecord, ResponseUpdate, SectionView, ViewerMode};
use rms_core::types::DbId;
use rms_db::models::rating::{Rating, RatingRow};
use rms_db::models::rating_document::RatingDocument;
use rms_db::repositories::{RatingDocumentRepo, RatingRepo};

use crate::error::AppResult;
use crate::middleware::auth::ClientUser;
use crate::query::{DocumentFilter, ListParams, ViewerParams};
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{cached_list, not_found, ListPage};
use super::document::parse_filter;
use super::rating::{COLUMNS, ENTITY};
use super::rating_questionnaire::{record_response, render_section, ResponseForm};

/// GET /api/v1/portal/ratings
pub async fn list(
    State(state): State<AppState>,
    client: ClientUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<RatingRow>>>> {
    let query = params.to_query();
    let pool = state.pool.clone();
    let fetch_query = query.clone();
    let client_id = client.client_id;
    let fetch = async move {
        let (rows, total) = tokio::try_join!(
            RatingRepo::search(&pool, &fetch_query, Some(client_id)),
            RatingRepo::count(&pool, &fetch_query, Some(client_id)),
        )?;
        Ok::<_, sqlx::Error>(ListResult::new(
            COLUMNS,
            rows,
            fetch_query.meta(total),
            "Search your ratings",
        ))
    };
    let page = cached_list(&state, &client.claims, &query, fetch).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/portal/ratings/{id}
pub async fn get(
    State(state): State<AppState>,
    client: ClientUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Rating>>> {
    let rating = own_rating(&state, &client, id).await?;
    Ok(Json(DataResponse { data: rating }))
}

/// GET /api/v1/portal/ratings/{id}/questionnaire?header=&mode=edit|view
///
/// Read-only unless `mode=edit` is asked for.
pub async fn questionnaire(
    State(state): State<AppState>,
    client: ClientUser,
    Path(id): Path<DbId>,
    Query(params): Query<ViewerParams>,
) -> AppResult<Json<DataResponse<SectionView>>> {
    let rating = own_rating(&state, &client, id).await?;
    let section = render_section(rating.questions.0, &params, ViewerMode::ReadOnly)?;
    Ok(Json(DataResponse { data: section }))
}

/// POST /api/v1/portal/ratings/{id}/questionnaire/responses
pub async fn respond(
    State(state): State<AppState>,
    client: ClientUser,
    Path(id): Path<DbId>,
    Form(input): Form<ResponseForm>,
) -> AppResult<Json<ActionResponse<QuestionRecord>>> {
    let record = record_response(
        &state.pool,
        id,
        Some(client.client_id),
        &input.question,
        ResponseUpdate {
            text: Some(input.text),
            file_url: None,
        },
    )
    .await?;
    tracing::info!(rating_id = id, client_id = client.client_id, login_id = ?client.login_id, "Client response saved");
    state
        .sessions
        .notify(&client.claims, Notice::success("questionnaire-response", "Response saved"))
        .await;
    Ok(Json(ActionResponse::ok("Response saved", record)))
}

/// GET /api/v1/portal/ratings/{id}/documents?kind=
pub async fn documents(
    State(state): State<AppState>,
    client: ClientUser,
    Path(id): Path<DbId>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Json<DataResponse<Vec<RatingDocument>>>> {
    own_rating(&state, &client, id).await?;
    let kind = parse_filter(&filter)?;
    let documents = RatingDocumentRepo::list_by_rating(&state.pool, id, kind).await?;
    Ok(Json(DataResponse { data: documents }))
}

async fn own_rating(state: &AppState, client: &ClientUser, id: DbId) -> AppResult<Rating> {
    RatingRepo::find_for_client(&state.pool, id, client.client_id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))
}
