//! Handlers for the `/clients` resource and their additional logins.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Form, Json};
use rms_core::error::CoreError;
use rms_core::form::{collect_credential_pairs, into_dto, FormMethod, FormView, SubmissionMode};
use rms_core::notice::Notice;
use rms_core::pagination::ListResult;
use rms_core::schemas;
use rms_core::types::DbId;
use rms_db::models::client::{Client, ClientRow, CreateClient, UpdateClient};
use rms_db::models::client_login::{ClientLogin, CreateClientLogin};
use rms_db::repositories::{ClientLoginRepo, ClientRepo};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::StaffUser;
use crate::query::{CredentialPairsParam, ListParams};
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::{
    cached_list, form_view, hash_secret, not_found, parse_form, record_json, stamp_creator,
    ListPage,
};

const ENTITY: &str = "Client";
const COLUMNS: &[&str] = &["companyName", "email", "phone", "contactPerson", "industryName"];

/// Upper bound on credential pairs a create form can be grown to.
const MAX_CREDENTIAL_PAIRS: usize = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginCredentialForm {
    pub email: String,
    pub password: String,
}

/// A client together with its additional logins.
#[derive(Debug, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub logins: Vec<ClientLogin>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/clients
///
/// Served through the session's client list cache.
pub async fn list(
    State(state): State<AppState>,
    staff: StaffUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<ListPage<ClientRow>>>> {
    let query = params.to_query();
    let pool = state.pool.clone();
    let fetch_query = query.clone();
    let fetch = async move {
        let (rows, total) = tokio::try_join!(
            ClientRepo::search(&pool, &fetch_query),
            ClientRepo::count(&pool, &fetch_query),
        )?;
        Ok::<_, sqlx::Error>(ListResult::new(
            COLUMNS,
            rows,
            fetch_query.meta(total),
            "Search clients",
        ))
    };
    let page = cached_list(&state, &staff.claims, &query, fetch).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/clients/form?logins=n
///
/// The create form, grown by `n` login email/password pairs.
pub async fn new_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Query(pairs): Query<CredentialPairsParam>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let mut form = form_view(
        &state.pool,
        &schemas::CLIENT,
        "/api/v1/clients".into(),
        FormMethod::Post,
        None,
    )
    .await?;
    for _ in 0..pairs.logins.min(MAX_CREDENTIAL_PAIRS) {
        form.append_credential_pair();
    }
    Ok(Json(DataResponse { data: form }))
}

/// GET /api/v1/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ClientDetail>>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let logins = ClientLoginRepo::list_by_client(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ClientDetail { client, logins },
    }))
}

/// GET /api/v1/clients/{id}/form
pub async fn edit_form(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<FormView>>> {
    let client = ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let record = record_json(&client)?;
    let form = form_view(
        &state.pool,
        &schemas::CLIENT,
        format!("/api/v1/clients/{id}"),
        FormMethod::Patch,
        Some(&record),
    )
    .await?;
    Ok(Json(DataResponse { data: form }))
}

/// POST /api/v1/clients
///
/// Creates the client, then every complete `loginEmail{n}`/`loginPassword{n}`
/// pair of the body as an additional login.
pub async fn create(
    State(state): State<AppState>,
    staff: StaffUser,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<(StatusCode, Json<ActionResponse<ClientDetail>>)> {
    let mut values = parse_form(&schemas::CLIENT, &body, SubmissionMode::Create)?;
    hash_secret(&mut values, false)?;
    stamp_creator(&mut values, staff.user_id);
    let input: CreateClient = into_dto(values)?;

    // Validate and hash every pair before anything is written.
    let pairs = collect_credential_pairs(&body)
        .into_iter()
        .map(|(email, password)| credential(&email, &password))
        .collect::<AppResult<Vec<_>>>()?;

    let client = ClientRepo::create(&state.pool, &input).await?;
    let logins_input: Vec<CreateClientLogin> = pairs
        .into_iter()
        .map(|(email, password_hash)| CreateClientLogin {
            client_id: client.id,
            email,
            password_hash,
        })
        .collect();
    let logins = if logins_input.is_empty() {
        Vec::new()
    } else {
        ClientLoginRepo::create_many(&state.pool, &logins_input).await?
    };

    tracing::info!(
        client_id = client.id,
        logins = logins.len(),
        user_id = staff.user_id,
        "Client created",
    );
    state
        .sessions
        .notify(&staff.claims, Notice::success("client-create", "Client created"))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok(
            "Client created",
            ClientDetail { client, logins },
        )),
    ))
}

/// PATCH /api/v1/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(body): Form<HashMap<String, String>>,
) -> AppResult<Json<ActionResponse<Client>>> {
    let mut values = parse_form(&schemas::CLIENT, &body, SubmissionMode::Update)?;
    hash_secret(&mut values, false)?;
    let input: UpdateClient = into_dto(values)?;

    let client = ClientRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    state
        .sessions
        .notify(&staff.claims, Notice::success("client-update", "Client updated"))
        .await;

    Ok(Json(ActionResponse::ok("Client updated", client)))
}

/// DELETE /api/v1/clients/{id}
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<ActionResponse<()>>> {
    if !ClientRepo::soft_delete(&state.pool, id).await? {
        return Err(not_found(ENTITY, id));
    }
    state.sessions.revoke_subject("client", id).await;
    tracing::info!(client_id = id, user_id = staff.user_id, "Client deleted");
    state
        .sessions
        .notify(&staff.claims, Notice::success("client-delete", "Client deleted"))
        .await;
    Ok(Json(ActionResponse::done("Client deleted")))
}

/// GET /api/v1/clients/{id}/logins
pub async fn list_logins(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ClientLogin>>>> {
    ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;
    let logins = ClientLoginRepo::list_by_client(&state.pool, id).await?;
    Ok(Json(DataResponse { data: logins }))
}

/// POST /api/v1/clients/{id}/logins
pub async fn add_login(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(input): Form<LoginCredentialForm>,
) -> AppResult<(StatusCode, Json<ActionResponse<ClientLogin>>)> {
    ClientRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(ENTITY, id))?;

    let (email, password_hash) = credential(&input.email, &input.password)?;
    let login = ClientLoginRepo::create(
        &state.pool,
        &CreateClientLogin {
            client_id: id,
            email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(client_id = id, login_id = login.id, "Client login added");
    state
        .sessions
        .notify(&staff.claims, Notice::success("client-login-create", "Login added"))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Login added", login)),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate one login credential and return `(normalized email, hash)`.
fn credential(email: &str, password: &str) -> AppResult<(String, String)> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        ))));
    }
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let hash = hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    Ok((email, hash))
}
