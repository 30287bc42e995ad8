//! Files attached to a rating (`/ratings/{id}/documents`).
//!
//! Receipts and invoices may only be uploaded or removed by the staff
//! assigned to the rating. A stored document is announced to the client's
//! contacts by email; a failed send is reported in the response and never
//! turns the upload into a failure.
//!
//! Every stored object belongs to exactly one document row or question
//! response. An upload whose object key is already taken is refused with 409
//! instead of overwriting the other file.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rms_cloud::ObjectStore;
use rms_core::error::CoreError;
use rms_core::notice::Notice;
use rms_core::questionnaire::references_file;
use rms_core::rating::ensure_rating_actor;
use rms_core::storage_key::{object_key, UploadKind};
use rms_core::types::DbId;
use rms_db::models::rating::Rating;
use rms_db::models::rating_document::{CreateRatingDocument, RatingDocument};
use rms_db::repositories::{ClientRepo, RatingDocumentRepo};
use rms_events::templates::{document_uploaded, DocumentNotice};
use rms_events::{send_batch, BatchReport};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::StaffUser;
use crate::multipart::read_upload;
use crate::query::DocumentFilter;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::not_found;
use super::rating::find_rating;

const ENTITY: &str = "Document";

/// A stored document and the outcome of its email notifications.
///
/// `notifications` is absent when no mailer is configured or the client has
/// no contact addresses.
#[derive(Debug, Serialize)]
pub struct UploadedDocument {
    pub document: RatingDocument,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<BatchReport>,
}

/// GET /api/v1/ratings/{id}/documents?kind=
pub async fn list(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Json<DataResponse<Vec<RatingDocument>>>> {
    find_rating(&state, id).await?;
    let kind = parse_filter(&filter)?;
    let documents = RatingDocumentRepo::list_by_rating(&state.pool, id, kind).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/ratings/{id}/documents/{kind}
///
/// Multipart with a single `file` part.
pub async fn upload(
    State(state): State<AppState>,
    staff: StaffUser,
    Path((id, kind)): Path<(DbId, String)>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ActionResponse<UploadedDocument>>)> {
    let kind = document_kind(&kind)?;
    let rating = find_rating(&state, id).await?;
    if kind.requires_rating_actor() {
        ensure_rating_actor(&rating.actors(), staff.user_id)?;
    }
    let storage = state.storage()?;

    let mut form = read_upload(multipart, kind).await?;
    let file = form.require_file()?;
    let key = object_key(rating.id, &file.file_name);
    ensure_key_free(&state, &rating, storage, &key, None).await?;
    let url = storage.put_file(&key, &file.path, &file.content_type).await?;

    let created = RatingDocumentRepo::create(
        &state.pool,
        &CreateRatingDocument {
            rating_id: rating.id,
            kind: kind.as_str().to_string(),
            file_name: file.file_name.clone(),
            object_key: key.clone(),
            url,
            size_bytes: file.size as i64,
            uploaded_by_user: Some(staff.user_id),
            uploaded_by_client: None,
        },
    )
    .await;
    let document = match created {
        Ok(document) => document,
        Err(e) => {
            // A concurrent upload won the key; the object is now its file.
            if !is_unique_violation(&e) {
                discard_object(storage, &key).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!(
        rating_id = rating.id,
        document_id = document.id,
        kind = kind.as_str(),
        size = document.size_bytes,
        user_id = staff.user_id,
        "Rating document stored",
    );

    let notifications = notify_contacts(&state, &rating, &document).await;
    let message = match &notifications {
        Some(report) if !report.all_sent() => format!(
            "Document uploaded; {} of {} notification emails failed",
            report.failed.len(),
            report.sent + report.failed.len()
        ),
        _ => "Document uploaded".to_string(),
    };
    state
        .sessions
        .notify(&staff.claims, Notice::success("document-upload", message.clone()))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok(
            message,
            UploadedDocument {
                document,
                notifications,
            },
        )),
    ))
}

/// DELETE /api/v1/ratings/{id}/documents/{doc_id}
///
/// The row is deleted inside a transaction that commits only once the stored
/// object is gone, so a storage failure leaves both in place.
pub async fn delete(
    State(state): State<AppState>,
    staff: StaffUser,
    Path((id, doc_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ActionResponse<()>>> {
    let rating = find_rating(&state, id).await?;
    let document = RatingDocumentRepo::find(&state.pool, id, doc_id)
        .await?
        .ok_or_else(|| not_found(ENTITY, doc_id))?;
    if UploadKind::parse(&document.kind).is_some_and(UploadKind::requires_rating_actor) {
        ensure_rating_actor(&rating.actors(), staff.user_id)?;
    }
    let storage = state.storage()?;

    let mut tx = state.pool.begin().await?;
    if !RatingDocumentRepo::delete(&mut *tx, id, doc_id).await? {
        return Err(not_found(ENTITY, doc_id));
    }
    storage.delete_object(&document.object_key).await?;
    tx.commit().await?;
    tracing::info!(rating_id = id, document_id = doc_id, user_id = staff.user_id, "Rating document deleted");
    state
        .sessions
        .notify(&staff.claims, Notice::success("document-delete", "Document deleted"))
        .await;

    Ok(Json(ActionResponse::done("Document deleted")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Upload kinds accepted on the documents route. Questionnaire attachments
/// go through the questionnaire upload instead.
fn document_kind(raw: &str) -> AppResult<UploadKind> {
    match UploadKind::parse(raw) {
        Some(UploadKind::QuestionAttachment) | None => Err(AppError::BadRequest(format!(
            "Unknown document kind '{raw}'. Expected: receipt, invoice, document"
        ))),
        Some(kind) => Ok(kind),
    }
}

pub(crate) fn parse_filter(filter: &DocumentFilter) -> AppResult<Option<&'static str>> {
    match filter.kind.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => document_kind(raw).map(|kind| Some(kind.as_str())),
    }
}

/// Refuse an upload to `key` when a document row or a question response
/// other than `question` already refers to the object stored there.
pub(crate) async fn ensure_key_free(
    state: &AppState,
    rating: &Rating,
    storage: &dyn ObjectStore,
    key: &str,
    question: Option<&str>,
) -> AppResult<()> {
    let taken = RatingDocumentRepo::key_exists(&state.pool, key).await?
        || references_file(&rating.questions.0, &storage.object_url(key), question);
    if taken {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        return Err(CoreError::Conflict(format!(
            "A file named '{file_name}' is already stored for this rating; \
             rename the file or delete the existing one"
        ))
        .into());
    }
    Ok(())
}

/// Best-effort removal of an object whose row was never written.
pub(crate) async fn discard_object(storage: &dyn ObjectStore, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        tracing::warn!(key, error = %e, "Could not remove orphaned object");
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == "23505")
}

/// Email the client's contacts about `document`. Lookup failures are logged
/// and skip the notification.
async fn notify_contacts(
    state: &AppState,
    rating: &Rating,
    document: &RatingDocument,
) -> Option<BatchReport> {
    if !state.mailer.is_configured() {
        return None;
    }

    let contacts = tokio::try_join!(
        ClientRepo::find_by_id(&state.pool, rating.client_id),
        ClientRepo::contact_emails(&state.pool, rating.client_id),
    );
    let (client, recipients) = match contacts {
        Ok((Some(client), recipients)) if !recipients.is_empty() => (client, recipients),
        Ok(_) => return None,
        Err(e) => {
            tracing::warn!(client_id = rating.client_id, error = %e, "Could not load client contacts");
            return None;
        }
    };

    let messages = document_uploaded(
        &DocumentNotice {
            company_name: &client.company_name,
            rating_year: rating.rating_year,
            kind: &document.kind,
            file_name: &document.file_name,
            url: &document.url,
        },
        &recipients,
    );
    let mailer = state.mailer.clone();
    let report = send_batch(messages, |message| {
        let mailer = mailer.clone();
        async move { mailer.send(&message).await }
    })
    .await;
    Some(report)
}
