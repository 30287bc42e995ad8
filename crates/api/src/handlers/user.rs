//! Admin handlers for staff accounts (`/users`).
//!
//! Every endpoint requires the `admin` role. Passwords arrive in the form's
//! `password` field and are stored as argon2 hashes only.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::error::CoreError;
use rms_core::form::{into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::user::{CreateUser, UpdateUser, UserResponse};
use rms_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{form_view, hash_secret, list_page, not_found, parse_form, record_json, ListPage};

const ENTITY: &str = "User";
const COLUMNS: &[&str] = &["firstName", "lastName", "email", "role", "isActive", "lastLoginAt"];

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<UserResponse>>>> {
    let query = params.to_query();
    let (users, total) = tokio::try_join!(
        UserRepo::search(&state.pool, &query),
        UserRepo::count(&state.pool, &query),
    )?;
    let rows = users.into_iter().map(UserResponse::from).collect();
    let list = ListResult::new(COLUMNS, rows, query.meta(total), "Search users");
    Ok(Json(DataResponse {
        data: list_page(list, &query)?,
    }))
}

/// GET /api/v1/users/form
pub async fn new_form(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<FormView>>> {
    let form = form_view(
        &state.pool,
        &schemas::USER,
        "/api/v1/users".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/users/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/users/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let record = record_json(&UserResponse::from(user))?;
    let form = form_view(
        &state.pool,
        &schemas::USER,
        format!("/api/v1/users/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/users
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<UserResponse>>)> {
    let mut values = parse_form(&schemas::USER, &body, SubmissionMode::Create)?;
    hash_secret(&mut values, true)?;
    let input: CreateUser = into_dto(values)?;

    let user = UserRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, admin_id = admin.user_id, role = %user.role, "Staff user created");
    state
        .sessions
        .notify(&admin.claims, Notice::success("user-create", "User created"))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("User created", user.into())),
    ))
}

/// PATCH /api/v1/users/{id}
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<UserResponse>>> {
    let mut values = parse_form(&schemas::USER, &body, SubmissionMode::Update)?;
    hash_secret(&mut values, false)?;
    let input: UpdateUser = into_dto(values)?;

    if id == admin.user_id && input.is_active == Some(false) {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot deactivate your own account".into(),
        )));
    }

    let before = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    // Sessions carry role and active status; make the user sign in again.
    if user.role != before.role || (before.is_active && !user.is_active) {
        state.sessions.revoke_subject("user", id).await;
        tracing::info!(user_id = id, admin_id = admin.user_id, role = %user.role, active = user.is_active, "Staff user sessions revoked");
    }
    state
        .sessions
        .notify(&admin.claims, Notice::success("user-update", "User updated"))
        .await;

    Ok(Json(ActionResponse::ok("User updated", user.into())))
}

/// DELETE /api/v1/users/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot delete your own account".into(),
        )));
    }
    if !UserRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    state.sessions.revoke_subject("user", id).await;
    tracing::info!(user_id = id, admin_id = admin.user_id, "Staff user deleted");
    state
        .sessions
        .notify(&admin.claims, Notice::success("user-delete", "User deleted"))
        .await;
    Ok(Json(ActionResponse::done("User deleted")))
}
