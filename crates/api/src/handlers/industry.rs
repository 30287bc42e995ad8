//! Handlers for the `/industries` resource.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::form::{into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::industry::{CreateIndustry, Industry, UpdateIndustry};
use rms_db::repositories::IndustryRepo;

use crate::error::AppResult;
use crate::middleware::auth::StaffUser;
use crate::query::ListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{form_view, list_page, not_found, parse_form, record_json, stamp_creator, ListPage};

const ENTITY: &str = "Industry";
const COLUMNS: &[&str] = &["name", "description", "updatedAt"];

/// GET /api/v1/industries
pub async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<Industry>>>> {
    let query = params.to_query();
    let (rows, total) = tokio::try_join!(
        IndustryRepo::search(&state.pool, &query),
        IndustryRepo::count(&state.pool, &query),
    )?;
    let list = ListResult::new(COLUMNS, rows, query.meta(total), "Search industries");
    Ok(Json(DataResponse {
        data: list_page(list, &query)?,
    }))
}

/// GET /api/v1/industries/form
pub async fn new_form(
    State(state): State<AppState>,
    _staff: StaffUser,
) -> AppResult<Json<DataResponse<FormView>>> {
    let form = form_view(
        &state.pool,
        &schemas::INDUSTRY,
        "/api/v1/industries".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/industries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Industry>>> {
    let industry = IndustryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: industry }))
}

/// GET /api/v1/industries/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let industry = IndustryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let record = record_json(&industry)?;
    let form = form_view(
        &state.pool,
        &schemas::INDUSTRY,
        format!("/api/v1/industries/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/industries
pub async fn create(
    State(state): State<AppState>,
    staff: StaffUser,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<Industry>>)> {
    let mut values = parse_form(&schemas::INDUSTRY, &body, SubmissionMode::Create)?;
    stamp_creator(&mut values, staff.user_id);
    let input: CreateIndustry = into_dto(values)?;

    let industry = IndustryRepo::create(&state.pool, &input).await?;
    tracing::info!(industry_id = industry.id, user_id = staff.user_id, "Industry created");
    state
        .sessions
        .notify(&staff.claims, Notice::success("industry-create", "Industry created"))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Industry created", industry)),
    ))
}

/// PATCH /api/v1/industries/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<Industry>>> {
    let values = parse_form(&schemas::INDUSTRY, &body, SubmissionMode::Update)?;
    let input: UpdateIndustry = into_dto(values)?;

    let industry = IndustryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    state
        .sessions
        .notify(&staff.claims, Notice::success("industry-update", "Industry updated"))
        .await;

    Ok(Json(ActionResponse::ok("Industry updated", industry)))
}

/// DELETE /api/v1/industries/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if !IndustryRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    state
        .sessions
        .notify(&staff.claims, Notice::success("industry-delete", "Industry deleted"))
        .await;
    Ok(Json(ActionResponse::done("Industry deleted")))
}
