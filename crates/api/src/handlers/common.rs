//! Helpers shared by the entity handlers: form parsing, reference options,
//! list pages and the per-session list cache.

use std::collections::HashMap;
use std::future::Future;

use rms_core::error::CoreError;
use rms_core::fields::{attach_options, introspect, EntitySchema, FieldDescriptor, SelectOption};
use rms_core::form::{parse_submission, render_form, FormMethod, FormView, SubmissionMode};
use rms_core::pagination::{ListQuery, ListResult};
use rms_core::table::TableView;
use rms_core::types::DbId;
use rms_db::repositories::{ClientRepo, IndustryRepo, MethodologyRepo, QuestionnaireRepo, UserRepo};
use rms_db::DbPool;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::jwt::Claims;
use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::session::registry::CachedList;
use crate::state::AppState;

/// Shown when a list query fails and nothing is cached.
const LIST_FAILED_MESSAGE: &str = "Could not load the list, please try again later";

/// Fields whose options are the active staff members.
const STAFF_FIELDS: &[&str] = &["supervisorId", "primaryAnalystId", "secondaryAnalystId"];

pub fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Validate a form body against the editable fields of `schema`.
pub fn parse_form(
    schema: &EntitySchema,
    body: &HashMap<String, String>,
    mode: SubmissionMode,
) -> AppResult<Map<String, Value>> {
    let descriptors = introspect(schema);
    Ok(parse_submission(&descriptors, body, mode)?)
}

/// Replace a submitted `password` with its argon2 hash under `passwordHash`.
pub fn hash_secret(values: &mut Map<String, Value>, required: bool) -> AppResult<()> {
    match values.remove("password") {
        Some(Value::String(password)) => {
            validate_password_strength(&password, MIN_PASSWORD_LENGTH)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            let hash = hash_password(&password)
                .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
            values.insert("passwordHash".into(), Value::String(hash));
            Ok(())
        }
        _ if required => Err(AppError::Core(CoreError::Validation(
            "password is required".into(),
        ))),
        _ => Ok(()),
    }
}

pub fn stamp_creator(values: &mut Map<String, Value>, user_id: DbId) {
    values.insert("createdBy".into(), Value::from(user_id));
}

/// Render the form of `schema`, with reference fields populated from the
/// database and values pre-filled from `record` when editing.
pub async fn form_view(
    pool: &DbPool,
    schema: &EntitySchema,
    action: String,
    method: FormMethod,
    record: Option<&Value>,
) -> AppResult<FormView> {
    let mut descriptors = introspect(schema);
    attach_reference_options(pool, &mut descriptors).await?;
    Ok(render_form(action, method, &descriptors, record))
}

/// Serialize a record for form pre-filling.
pub fn record_json<T: Serialize>(record: &T) -> AppResult<Value> {
    serde_json::to_value(record)
        .map_err(|e| AppError::InternalError(format!("Record serialization failed: {e}")))
}

/// Load the options of every foreign-key field present in `descriptors`.
pub async fn attach_reference_options(
    pool: &DbPool,
    descriptors: &mut [FieldDescriptor],
) -> AppResult<()> {
    let has = |descriptors: &[FieldDescriptor], field: &str| {
        descriptors.iter().any(|d| d.field == field)
    };

    if has(descriptors, "industryId") {
        let options = IndustryRepo::list_all(pool)
            .await?
            .into_iter()
            .map(|i| SelectOption::new(i.id.to_string(), i.name))
            .collect();
        attach_options(descriptors, "industryId", options);
    }
    if has(descriptors, "clientId") {
        let options = ClientRepo::list_all(pool)
            .await?
            .into_iter()
            .map(|c| SelectOption::new(c.id.to_string(), c.company_name))
            .collect();
        attach_options(descriptors, "clientId", options);
    }
    if has(descriptors, "methodologyId") {
        let options = MethodologyRepo::list_all(pool)
            .await?
            .into_iter()
            .map(|m| SelectOption::new(m.id.to_string(), m.name))
            .collect();
        attach_options(descriptors, "methodologyId", options);
    }
    if has(descriptors, "questionnaireId") {
        let options = QuestionnaireRepo::list_all(pool)
            .await?
            .into_iter()
            .map(|q| SelectOption::new(q.id.to_string(), q.name))
            .collect();
        attach_options(descriptors, "questionnaireId", options);
    }
    if STAFF_FIELDS.iter().any(|f| has(descriptors, f)) {
        let staff: Vec<SelectOption> = UserRepo::list_active(pool)
            .await?
            .iter()
            .map(|u| SelectOption::new(u.id.to_string(), u.full_name()))
            .collect();
        for field in STAFF_FIELDS {
            attach_options(descriptors, field, staff.clone());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// A list page: the raw rows plus their table rendering.
#[derive(Debug, Serialize)]
pub struct ListPage<T: Serialize> {
    pub list: ListResult<T>,
    pub table: TableView,
}

pub fn list_page<T: Serialize>(list: ListResult<T>, query: &ListQuery) -> AppResult<ListPage<T>> {
    let table = TableView::build(&list, query)?;
    Ok(ListPage { list, table })
}

/// Run `fetch` through the session's cached list view of `T`.
///
/// On failure the last loaded page of this session is served again with its
/// `error` set, and an error notice is queued. With nothing cached the
/// failure propagates.
pub async fn cached_list<T, Fut>(
    state: &AppState,
    claims: &Claims,
    query: &ListQuery,
    fetch: Fut,
) -> AppResult<ListPage<T>>
where
    T: CachedList + Serialize,
    Fut: Future<Output = Result<ListResult<T>, sqlx::Error>>,
{
    let session = state.sessions.session(claims).await;
    {
        let mut guard = session.lock().await;
        T::list_view(&mut *guard).begin(query.clone());
    }

    let (outcome, failure) = match fetch.await {
        Ok(list) => (Ok(list), None),
        Err(e) => {
            tracing::error!(error = %e, "List query failed");
            (Err(LIST_FAILED_MESSAGE.to_string()), Some(e))
        }
    };

    let resolved = {
        let mut guard = session.lock().await;
        let resolved = T::list_view(&mut *guard).resolve(outcome);
        if let Some(notice) = resolved.notice.clone() {
            guard.notices.push(notice);
        }
        resolved
    };

    match (resolved.data, failure) {
        (Some(list), _) => list_page(list, query),
        (None, Some(e)) => Err(e.into()),
        (None, None) => Err(AppError::InternalError(LIST_FAILED_MESSAGE.into())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rms_core::schemas;

    use super::*;

    fn body(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn secret_is_hashed_and_removed() {
        let mut values = parse_form(
            &schemas::CLIENT,
            &body(&[
                ("companyName", "Acme"),
                ("email", "Ops@Acme.test"),
                ("password", "correct-horse"),
            ]),
            SubmissionMode::Create,
        )
        .unwrap();
        hash_secret(&mut values, false).unwrap();

        assert!(!values.contains_key("password"));
        let hash = values["passwordHash"].as_str().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert_eq!(values["email"], "ops@acme.test");
    }

    #[test]
    fn missing_required_secret_is_rejected() {
        let mut values = Map::new();
        assert_matches!(
            hash_secret(&mut values, true),
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert!(hash_secret(&mut values, false).is_ok());
    }

    #[test]
    fn short_secret_is_rejected() {
        let mut values = Map::new();
        values.insert("password".into(), Value::String("short".into()));
        assert_matches!(
            hash_secret(&mut values, false),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }

    #[test]
    fn creator_is_stamped() {
        let mut values = Map::new();
        stamp_creator(&mut values, 42);
        assert_eq!(values["createdBy"], 42);
    }
}
