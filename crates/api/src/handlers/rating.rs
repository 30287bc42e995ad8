//! Handlers for the `/ratings` resource.
//!
//! Creating a rating with a questionnaire downloads the questionnaire's
//! template and instantiates its questions. A failed download does not fail
//! the create: the rating starts with no questions and an error notice is
//! queued for the session.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::error::CoreError;
use rms_core::form::{into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::questionnaire::{QuestionRecord, QuestionnaireTemplate};
use rms_core::rating::validate_rating_year;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::rating::{CreateRating, Rating, RatingRow, UpdateRating};
use rms_db::repositories::{QuestionnaireRepo, RatingRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::StaffUser;
use crate::query::ListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{cached_list, form_view, not_found, parse_form, record_json, stamp_creator, ListPage};

pub(crate) const ENTITY: &str = "Rating";
pub(crate) const COLUMNS: &[&str] = &[
    "companyName",
    "ratingYear",
    "statusName",
    "ratingScore",
    "outlook",
    "updatedAt",
];

/// Notice id of a failed template download.
pub const QUESTIONNAIRE_NOTICE: &str = "rating-questionnaire";

/// GET /api/v1/ratings
///
/// Served through the session's rating list cache.
pub async fn list(
    State(state): State<AppState>,
    staff: StaffUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<RatingRow>>>> {
    let query = params.to_query();
    let pool = state.pool.clone();
    let fetch_query = query.clone();
    let fetch = async move {
        let (rows, total) = tokio::try_join!(
            RatingRepo::search(&pool, &fetch_query, None),
            RatingRepo::count(&pool, &fetch_query, None),
        )?;
        Ok::<_, sqlx::Error>(ListResult::new(
            COLUMNS,
            rows,
            fetch_query.meta(total),
            "Search ratings by company",
        ))
    };
    let page = cached_list(&state, &staff.claims, &query, fetch).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/ratings/form
pub async fn new_form(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<DataResponse<FormView>>> {
    let form = form_view(
        &state.pool,
        &schemas::RATING,
        "/api/v1/ratings".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/ratings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Rating>>> {
    let rating = find_rating(&state, id).await?;
    Ok(Json(DataResponse { data: rating }))
}

/// GET /api/v1/ratings/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let rating = find_rating(&state, id).await?;
    let record = record_json(&rating)?;
    let form = form_view(
        &state.pool,
        &schemas::RATING,
        format!("/api/v1/ratings/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/ratings
pub async fn create(
    State(state): State<AppState>,
    staff: StaffUser,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<Rating>>)> {
    let mut values = parse_form(&schemas::RATING, &body, SubmissionMode::Create)?;
    stamp_creator(&mut values, staff.user_id);
    let mut input: CreateRating = into_dto(values)?;
    validate_rating_year(input.rating_year)?;

    let mut template_failed = false;
    if let Some(questionnaire_id) = input.questionnaire_id {
        let questionnaire = QuestionnaireRepo::find_by_id(&state.pool, questionnaire_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Questionnaire {questionnaire_id} does not exist"
                )))
            })?;

        match fetch_template(&state.http, &questionnaire.template_url).await {
            Ok(questions) => input.questions = questions,
            Err(e) => {
                tracing::warn!(
                    questionnaire_id,
                    url = %questionnaire.template_url,
                    error = %e,
                    "Questionnaire template unavailable, creating rating without questions",
                );
                template_failed = true;
            }
        }
    }

    let rating = RatingRepo::create(&state.pool, &input).await?;
    tracing::info!(
        rating_id = rating.id,
        client_id = rating.client_id,
        questions = rating.questions.len(),
        user_id = staff.user_id,
        "Rating created",
    );

    let message = if template_failed {
        state
            .sessions
            .notify(
                &staff.claims,
                Notice::error(
                    QUESTIONNAIRE_NOTICE,
                    "The questionnaire could not be loaded; the rating has no questions yet",
                ),
            )
            .await;
        "Rating created without questionnaire"
    } else {
        "Rating created"
    };
    state
        .sessions
        .notify(&staff.claims, Notice::success("rating-create", message))
        .await;

    Ok((StatusCode::CREATED, Json(ActionResponse::ok(message, rating))))
}

/// PATCH /api/v1/ratings/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<Rating>>> {
    let values = parse_form(&schemas::RATING, &body, SubmissionMode::Update)?;
    let input: UpdateRating = into_dto(values)?;
    if let Some(year) = input.rating_year {
        validate_rating_year(year)?;
    }

    let rating = RatingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    state
        .sessions
        .notify(&staff.claims, Notice::success("rating-update", "Rating updated"))
        .await;

    Ok(Json(ActionResponse::ok("Rating updated", rating)))
}

/// DELETE /api/v1/ratings/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if !RatingRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    tracing::info!(rating_id = id, user_id = staff.user_id, "Rating deleted");
    state
        .sessions
        .notify(&staff.claims, Notice::success("rating-delete", "Rating deleted"))
        .await;
    Ok(Json(ActionResponse::done("Rating deleted")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_rating(state: &AppState, id: DbId) -> AppResult<Rating> {
    RatingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))
}

/// Download and instantiate a questionnaire template.
async fn fetch_template(
    http: &reqwest::Client,
    url: &str,
) -> Result<Vec<QuestionRecord>, CoreError> {
    let body = http
        .get(url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CoreError::Upstream(format!("Template download failed: {e}")))?
        .text()
        .await
        .map_err(|e| CoreError::Upstream(format!("Template download failed: {e}")))?;

    Ok(QuestionnaireTemplate::parse(&body)?.instantiate())
}
