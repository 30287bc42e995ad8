//! Questionnaire of a rating: section viewer, text responses and file
//! attachments (`/ratings/{id}/questionnaire`).

use axum::extract::{Multipart, Path, Query, State};
use axum::{Form, Json};
use rms_core::error::CoreError;
use rms_core::notice::Notice;
use rms_core::questionnaire::{
    references_file, QuestionRecord, QuestionnaireViewer, ResponseUpdate, SectionView,
    ViewerInput, ViewerMode,
};
use rms_core::storage_key::{object_key, UploadKind};
use rms_core::types::DbId;
use rms_db::repositories::{RatingRepo, RespondOutcome};
use rms_db::DbPool;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::StaffUser;
use crate::multipart::read_upload;
use crate::query::ViewerParams;
use crate::response::{ActionResponse, DataResponse};
use crate::state::AppState;
use super::common::not_found;
use super::document::{discard_object, ensure_key_free};
use super::rating::{find_rating, ENTITY};

#[derive(Debug, Deserialize)]
pub struct ResponseForm {
    pub question: String,
    pub text: String,
}

/// Render one section of `questions` as requested by `params`.
pub(crate) fn render_section(
    questions: Vec<QuestionRecord>,
    params: &ViewerParams,
    default_mode: ViewerMode,
) -> AppResult<SectionView> {
    let mode = params.mode(default_mode)?;
    let mut viewer = QuestionnaireViewer::new(ViewerInput::Flat(questions), mode);
    if let Some(header) = params.header.as_deref() {
        // Unknown headers keep the first section active.
        viewer.select(header);
    }
    Ok(viewer.render())
}

/// Overwrite a response and return the updated question.
///
/// `client_id` restricts the write to that client's ratings.
pub(crate) async fn record_response(
    pool: &DbPool,
    rating_id: DbId,
    client_id: Option<DbId>,
    question: &str,
    update: ResponseUpdate,
) -> AppResult<QuestionRecord> {
    match RatingRepo::respond(pool, rating_id, client_id, question, update).await? {
        RespondOutcome::Updated(questions) => questions
            .into_iter()
            .find(|record| record.question == question)
            .ok_or_else(|| AppError::InternalError("Updated question vanished".into())),
        RespondOutcome::RatingNotFound => Err(not_found(ENTITY, rating_id)),
        RespondOutcome::UnknownQuestion => Err(AppError::Core(CoreError::Validation(format!(
            "Unknown question '{question}'"
        )))),
    }
}

/// GET /api/v1/ratings/{id}/questionnaire?header=&mode=edit|view
///
/// Staff see the questionnaire in edit mode unless they ask for `view`.
pub async fn view(
    State(state): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<DbId>,
    Query(params): Query<ViewerParams>,
) -> AppResult<Json<DataResponse<SectionView>>> {
    let rating = find_rating(&state, id).await?;
    let section = render_section(rating.questions.0, &params, ViewerMode::Edit)?;
    Ok(Json(DataResponse { data: section }))
}

/// POST /api/v1/ratings/{id}/questionnaire/responses
pub async fn respond(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    Form(input): Form<ResponseForm>,
) -> AppResult<Json<ActionResponse<QuestionRecord>>> {
    let record = record_response(
        &state.pool,
        id,
        None,
        &input.question,
        ResponseUpdate {
            text: Some(input.text),
            file_url: None,
        },
    )
    .await?;
    state
        .sessions
        .notify(&staff.claims, Notice::success("questionnaire-response", "Response saved"))
        .await;
    Ok(Json(ActionResponse::ok("Response saved", record)))
}

/// POST /api/v1/ratings/{id}/questionnaire/upload
///
/// Multipart with a `question` field and a `file` part. The file is stored
/// under the rating and its URL becomes the question's file reference.
pub async fn upload(
    State(state): State<AppState>,
    staff: StaffUser,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<ActionResponse<QuestionRecord>>> {
    let rating = find_rating(&state, id).await?;
    let storage = state.storage()?;

    let mut form = read_upload(multipart, UploadKind::QuestionAttachment).await?;
    let question = form
        .text("question")
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("Missing required 'question' field".into()))?;
    let file = form.require_file()?;

    let viewer = QuestionnaireViewer::new(
        ViewerInput::Flat(rating.questions.0.clone()),
        ViewerMode::Edit,
    );
    let key = viewer.request_upload(&question, |_| object_key(rating.id, &file.file_name))?;
    // Re-uploading the file a question already holds replaces it.
    ensure_key_free(&state, &rating, storage, &key, Some(&question)).await?;
    let replacing = references_file(&rating.questions.0, &storage.object_url(&key), None);
    let url = storage.put_file(&key, &file.path, &file.content_type).await?;

    let recorded = record_response(
        &state.pool,
        id,
        None,
        &question,
        ResponseUpdate {
            text: None,
            file_url: Some(url),
        },
    )
    .await;
    let record = match recorded {
        Ok(record) => record,
        Err(e) => {
            if !replacing {
                discard_object(storage, &key).await;
            }
            return Err(e);
        }
    };
    tracing::info!(rating_id = id, key = %key, user_id = staff.user_id, "Questionnaire attachment stored");
    state
        .sessions
        .notify(&staff.claims, Notice::success("questionnaire-upload", "File attached"))
        .await;

    Ok(Json(ActionResponse::ok("File attached", record)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rms_core::questionnaire::QuestionResponse;

    use super::*;

    fn record(header: &str, question: &str, file_url: Option<&str>) -> QuestionRecord {
        QuestionRecord {
            header: header.into(),
            question: question.into(),
            sub_questions: vec![],
            response: file_url.map(|url| QuestionResponse {
                text: None,
                file_url: Some(url.into()),
            }),
        }
    }

    fn questions() -> Vec<QuestionRecord> {
        vec![
            record("Governance", "Board size?", None),
            record("Finance", "Audited accounts?", Some("https://files.test/1/accounts.pdf")),
            record("Finance", "Debt ratio?", None),
        ]
    }

    #[test]
    fn renders_requested_section() {
        let params = ViewerParams {
            header: Some("Finance".into()),
            mode: None,
        };
        let section = render_section(questions(), &params, ViewerMode::ReadOnly).unwrap();
        assert_eq!(section.active_header.as_deref(), Some("Finance"));
        assert_eq!(section.questions.len(), 2);
        assert!(section.questions.iter().all(|q| !q.text.enabled));
        assert_eq!(
            section.questions[0].view_url.as_deref(),
            Some("https://files.test/1/accounts.pdf")
        );
        assert_eq!(section.questions[1].view_url, None);
    }

    #[test]
    fn unknown_header_keeps_first_section() {
        let params = ViewerParams {
            header: Some("Marketing".into()),
            mode: Some("edit".into()),
        };
        let section = render_section(questions(), &params, ViewerMode::ReadOnly).unwrap();
        assert_eq!(section.active_header.as_deref(), Some("Governance"));
        assert!(section.questions[0].upload_enabled);
    }

    #[test]
    fn bad_mode_is_rejected() {
        let params = ViewerParams {
            header: None,
            mode: Some("admin".into()),
        };
        assert_matches!(
            render_section(questions(), &params, ViewerMode::Edit),
            Err(AppError::BadRequest(_))
        );
    }
}
