//! Handlers for the `/methodologies` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::form::{into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::methodology::{CreateMethodology, Methodology, MethodologyRow, UpdateMethodology};
use rms_db::repositories::MethodologyRepo;

use crate::error::AppResult;
use crate::middleware::auth::StaffUser;
use crate::query::ListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{form_view, list_page, not_found, parse_form, record_json, stamp_creator, ListPage};

const ENTITY: &str = "Methodology";
const COLUMNS: &[&str] = &["name", "industryName", "documentUrl", "updatedAt"];

/// GET /api/v1/methodologies
pub async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<MethodologyRow>>>> {
    let query = params.to_query();
    let (rows, total) = tokio::try_join!(
        MethodologyRepo::search(&state.pool, &query),
        MethodologyRepo::count(&state.pool, &query),
    )?;
    let list = ListResult::new(COLUMNS, rows, query.meta(total), "Search methodologies");
    Ok(Json(DataResponse {
        data: list_page(list, &query)?,
    }))
}

/// GET /api/v1/methodologies/form
pub async fn new_form(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<DataResponse<FormView>>> {
    let form = form_view(
        &state.pool,
        &schemas::METHODOLOGY,
        "/api/v1/methodologies".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/methodologies/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Methodology>>> {
    let methodology = MethodologyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: methodology }))
}

/// GET /api/v1/methodologies/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let methodology = MethodologyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let record = record_json(&methodology)?;
    let form = form_view(
        &state.pool,
        &schemas::METHODOLOGY,
        format!("/api/v1/methodologies/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/methodologies
pub async fn create(
    State(state): State<AppState>,
    staff: StaffUser,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<Methodology>>)> {
    let mut values = parse_form(&schemas::METHODOLOGY, &body, SubmissionMode::Create)?;
    stamp_creator(&mut values, staff.user_id);
    let input: CreateMethodology = into_dto(values)?;

    let methodology = MethodologyRepo::create(&state.pool, &input).await?;
    tracing::info!(methodology_id = methodology.id, user_id = staff.user_id, "Methodology created");
    state
        .sessions
        .notify(&staff.claims, Notice::success("methodology-create", "Methodology created"))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Methodology created", methodology)),
    ))
}

/// PATCH /api/v1/methodologies/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<Methodology>>> {
    let values = parse_form(&schemas::METHODOLOGY, &body, SubmissionMode::Update)?;
    let input: UpdateMethodology = into_dto(values)?;

    let methodology = MethodologyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    state
        .sessions
        .notify(&staff.claims, Notice::success("methodology-update", "Methodology updated"))
        .await;

    Ok(Json(ActionResponse::ok("Methodology updated", methodology)))
}

/// DELETE /api/v1/methodologies/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if !MethodologyRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    state
        .sessions
        .notify(&staff.claims, Notice::success("methodology-delete", "Methodology deleted"))
        .await;
    Ok(Json(ActionResponse::done("Methodology deleted")))
}
