//! Handlers for the `/questionnaires` resource (template registry).

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::form::{into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::questionnaire::{CreateQuestionnaire, Questionnaire, UpdateQuestionnaire};
use rms_db::repositories::QuestionnaireRepo;

use crate::error::AppResult;
use crate::middleware::auth::StaffUser;
use crate::query::ListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{form_view, list_page, not_found, parse_form, record_json, stamp_creator, ListPage};

const ENTITY: &str = "Questionnaire";
const COLUMNS: &[&str] = &["name", "templateUrl", "updatedAt"];

/// GET /api/v1/questionnaires
pub async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<Questionnaire>>>> {
    let query = params.to_query();
    let (rows, total) = tokio::try_join!(
        QuestionnaireRepo::search(&state.pool, &query),
        QuestionnaireRepo::count(&state.pool, &query),
    )?;
    let list = ListResult::new(COLUMNS, rows, query.meta(total), "Search questionnaires");
    Ok(Json(DataResponse {
        data: list_page(list, &query)?,
    }))
}

/// GET /api/v1/questionnaires/form
pub async fn new_form(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<DataResponse<FormView>>> {
    let form = form_view(
        &state.pool,
        &schemas::QUESTIONNAIRE,
        "/api/v1/questionnaires".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/questionnaires/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Questionnaire>>> {
    let questionnaire = QuestionnaireRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse {
        data: questionnaire,
    }))
}

/// GET /api/v1/questionnaires/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let questionnaire = QuestionnaireRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let record = record_json(&questionnaire)?;
    let form = form_view(
        &state.pool,
        &schemas::QUESTIONNAIRE,
        format!("/api/v1/questionnaires/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/questionnaires
pub async fn create(
    State(state): State<AppState>,
    staff: StaffUser,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<Questionnaire>>)> {
    let mut values = parse_form(&schemas::QUESTIONNAIRE, &body, SubmissionMode::Create)?;
    stamp_creator(&mut values, staff.user_id);
    let input: CreateQuestionnaire = into_dto(values)?;

    let questionnaire = QuestionnaireRepo::create(&state.pool, &input).await?;
    tracing::info!(questionnaire_id = questionnaire.id, user_id = staff.user_id, "Questionnaire created");
    state
        .sessions
        .notify(
            &staff.claims,
            Notice::success("questionnaire-create", "Questionnaire created"),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Questionnaire created", questionnaire)),
    ))
}

/// PATCH /api/v1/questionnaires/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<Questionnaire>>> {
    let values = parse_form(&schemas::QUESTIONNAIRE, &body, SubmissionMode::Update)?;
    let input: UpdateQuestionnaire = into_dto(values)?;

    let questionnaire = QuestionnaireRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    state
        .sessions
        .notify(
            &staff.claims,
            Notice::success("questionnaire-update", "Questionnaire updated"),
        )
        .await;

    Ok(Json(ActionResponse::ok("Questionnaire updated", questionnaire)))
}

/// DELETE /api/v1/questionnaires/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if !QuestionnaireRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    state
        .sessions
        .notify(
            &staff.claims,
            Notice::success("questionnaire-delete", "Questionnaire deleted"),
        )
        .await;
    Ok(Json(ActionResponse::done("Questionnaire deleted")))
}
