//! Form rendering and form-submission parsing.
//!
//! A [`FormView`] is the serializable description of one create/update/delete
//! form: its target, its method, and one [`FormInput`] per field descriptor,
//! pre-filled from an existing record when editing. Rendering never performs
//! the network call; [`FormView::submission`] produces the flat body a caller
//! sends through whatever channel it owns.
//!
//! On the server side [`parse_submission`] is the single validation boundary
//! for form posts: it checks required fields and converts string values to
//! typed JSON according to the same descriptors.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::fields::{FieldDescriptor, FieldType, SelectOption};

/// Prefix of synthesized login-email fields (`loginEmail1`, `loginEmail2`, ...).
pub const LOGIN_EMAIL_PREFIX: &str = "loginEmail";

/// Prefix of synthesized login-password fields.
pub const LOGIN_PASSWORD_PREFIX: &str = "loginPassword";

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

/// HTTP method of a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormMethod {
    Post,
    Patch,
    Delete,
}

/// What a submission does server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormIntent {
    Create,
    Update,
    Delete,
}

impl FormMethod {
    /// `POST` creates, `PATCH` updates, `DELETE` deletes.
    pub fn intent(self) -> FormIntent {
        match self {
            Self::Post => FormIntent::Create,
            Self::Patch => FormIntent::Update,
            Self::Delete => FormIntent::Delete,
        }
    }

    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "POST" => Some(Self::Post),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

/// One rendered input of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub input_type: FieldType,
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl FormInput {
    fn from_descriptor(descriptor: &FieldDescriptor, record: Option<&serde_json::Value>) -> Self {
        let recorded = record
            .and_then(|r| r.get(&descriptor.field))
            .filter(|v| !v.is_null())
            .filter(|_| descriptor.field_type != FieldType::Password)
            .cloned();

        let value = recorded
            .or_else(|| descriptor.default_value.clone())
            .map(|v| match descriptor.field_type {
                // Option ids are strings; keep the pre-selected value comparable.
                FieldType::Select => serde_json::Value::String(scalar_to_string(&v)),
                _ => v,
            });

        Self {
            name: descriptor.field.clone(),
            label: humanize(&descriptor.field),
            input_type: descriptor.field_type,
            required: descriptor.required,
            hidden: false,
            value,
            options: descriptor.options.clone(),
        }
    }
}

/// A rendered form: target, method and ordered inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub action: String,
    pub method: FormMethod,
    pub inputs: Vec<FormInput>,
    /// Number of login credential pairs appended at runtime.
    #[serde(default)]
    pub credential_pairs: usize,
}

/// Flat body of one form submission, ready for the caller's transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSubmission {
    pub method: FormMethod,
    pub action: String,
    pub body: Vec<(String, String)>,
}

/// Render `descriptors` into a form posting to `action` with `method`.
///
/// Each input is pre-filled from `record` when it has a non-null value for the
/// field, otherwise from the descriptor's default. Password inputs are never
/// pre-filled.
pub fn render_form(
    action: impl Into<String>,
    method: FormMethod,
    descriptors: &[FieldDescriptor],
    record: Option<&serde_json::Value>,
) -> FormView {
    FormView {
        action: action.into(),
        method,
        inputs: descriptors
            .iter()
            .map(|d| FormInput::from_descriptor(d, record))
            .collect(),
        credential_pairs: 0,
    }
}

impl FormView {
    /// Add (or replace) a hidden system field such as a parent identifier.
    pub fn with_hidden(mut self, name: &str, value: impl ToString) -> Self {
        self.inputs.retain(|i| i.name != name);
        self.inputs.push(FormInput {
            name: name.to_string(),
            label: humanize(name),
            input_type: FieldType::Text,
            required: true,
            hidden: true,
            value: Some(serde_json::Value::String(value.to_string())),
            options: None,
        });
        self
    }

    /// Grow the form by one login email/password pair and return its index.
    pub fn append_credential_pair(&mut self) -> usize {
        self.credential_pairs += 1;
        let index = self.credential_pairs;
        for descriptor in credential_pair(index) {
            self.inputs.push(FormInput::from_descriptor(&descriptor, None));
        }
        index
    }

    pub fn input(&self, name: &str) -> Option<&FormInput> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// Serialize every input (hidden ones included) into one flat body.
    ///
    /// Values typed by the user in `entered` win over pre-filled values;
    /// inputs with neither are sent as empty strings.
    pub fn submission(&self, entered: &HashMap<String, String>) -> FormSubmission {
        let body = self
            .inputs
            .iter()
            .map(|input| {
                let value = entered
                    .get(&input.name)
                    .cloned()
                    .or_else(|| input.value.as_ref().map(scalar_to_string))
                    .unwrap_or_default();
                (input.name.clone(), value)
            })
            .collect();

        FormSubmission {
            method: self.method,
            action: self.action.clone(),
            body,
        }
    }
}

/// Synthesize the descriptors of login credential pair `index`.
pub fn credential_pair(index: usize) -> [FieldDescriptor; 2] {
    [
        FieldDescriptor::synthesized(format!("{LOGIN_EMAIL_PREFIX}{index}"), FieldType::Email, true),
        FieldDescriptor::synthesized(
            format!("{LOGIN_PASSWORD_PREFIX}{index}"),
            FieldType::Password,
            true,
        ),
    ]
}

/// Collect `(email, password)` pairs from `loginEmail{n}`/`loginPassword{n}`
/// keys of a submitted body, ordered by `n`. Pairs with an empty half are
/// skipped.
pub fn collect_credential_pairs(body: &HashMap<String, String>) -> Vec<(String, String)> {
    let mut indexed: Vec<(usize, String, String)> = body
        .iter()
        .filter_map(|(key, email)| {
            let index: usize = key.strip_prefix(LOGIN_EMAIL_PREFIX)?.parse().ok()?;
            let password = body.get(&format!("{LOGIN_PASSWORD_PREFIX}{index}"))?;
            let email = email.trim();
            if email.is_empty() || password.is_empty() {
                return None;
            }
            Some((index, email.to_string(), password.clone()))
        })
        .collect();
    indexed.sort_by_key(|(index, _, _)| *index);
    indexed.into_iter().map(|(_, e, p)| (e, p)).collect()
}

/// Turn a camelCase field name into a display label (`companyName` -> `Company Name`).
pub fn humanize(field: &str) -> String {
    let trimmed = field.strip_suffix("Id").filter(|s| !s.is_empty()).unwrap_or(field);
    let mut label = String::with_capacity(trimmed.len() + 4);
    for (i, ch) in trimmed.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() || (ch.is_ascii_digit() && !label.ends_with(|c: char| c.is_ascii_digit())) {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}

fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Submission parsing
// ---------------------------------------------------------------------------

/// Whether a submission creates a record or patches an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Missing required fields are errors; absent fields take their defaults.
    Create,
    /// Absent fields are left unchanged. A blank optional field is cleared
    /// (`null`); a blank password keeps the stored one.
    ///
    /// Checkboxes follow the same rule: an absent `Boolean` is left as is, so
    /// a client posting a native checkbox must send `false` (or an empty
    /// value) to turn it off. [`FormView::submission`] always does.
    Update,
}

/// Validate a flat form body against `descriptors` and convert it to typed JSON.
///
/// Keys that are not described are ignored. All field errors are reported
/// together in a single [`CoreError::Validation`].
pub fn parse_submission(
    descriptors: &[FieldDescriptor],
    body: &HashMap<String, String>,
    mode: SubmissionMode,
) -> Result<serde_json::Map<String, serde_json::Value>, CoreError> {
    let mut values = serde_json::Map::new();
    let mut errors = Vec::new();

    for descriptor in descriptors {
        let raw = body.get(&descriptor.field).map(|v| v.trim());

        // Unchecked checkboxes are simply absent from a form post.
        if descriptor.field_type == FieldType::Boolean {
            match (raw, mode) {
                (Some(v), _) => match parse_bool(v) {
                    Some(b) => {
                        values.insert(descriptor.field.clone(), b.into());
                    }
                    None => errors.push(format!("{} must be true or false", descriptor.field)),
                },
                (None, SubmissionMode::Create) => {
                    let default = descriptor
                        .default_value
                        .clone()
                        .unwrap_or(serde_json::Value::Bool(false));
                    values.insert(descriptor.field.clone(), default);
                }
                (None, SubmissionMode::Update) => {}
            }
            continue;
        }

        let raw = match raw.filter(|v| !v.is_empty()) {
            Some(v) => v,
            None => {
                if mode == SubmissionMode::Update
                    && raw.is_some()
                    && !descriptor.required
                    && descriptor.field_type != FieldType::Password
                {
                    values.insert(descriptor.field.clone(), serde_json::Value::Null);
                    continue;
                }
                let blank_required = descriptor.required
                    && (mode == SubmissionMode::Create || raw.is_some());
                if mode == SubmissionMode::Create {
                    if let Some(default) = &descriptor.default_value {
                        values.insert(descriptor.field.clone(), default.clone());
                        continue;
                    }
                }
                if blank_required {
                    errors.push(format!("{} is required", descriptor.field));
                }
                continue;
            }
        };

        match convert_value(descriptor, raw) {
            Ok(value) => {
                values.insert(descriptor.field.clone(), value);
            }
            Err(message) => errors.push(message),
        }
    }

    if errors.is_empty() {
        Ok(values)
    } else {
        Err(CoreError::Validation(errors.join("; ")))
    }
}

/// Deserialize parsed submission values into a typed DTO.
pub fn into_dto<T: DeserializeOwned>(
    values: serde_json::Map<String, serde_json::Value>,
) -> Result<T, CoreError> {
    serde_json::from_value(serde_json::Value::Object(values))
        .map_err(|e| CoreError::Validation(e.to_string()))
}

fn convert_value(descriptor: &FieldDescriptor, raw: &str) -> Result<serde_json::Value, String> {
    let field = &descriptor.field;
    match descriptor.field_type {
        FieldType::Number => {
            if let Ok(n) = raw.parse::<i64>() {
                Ok(n.into())
            } else {
                raw.parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| format!("{field} must be a number"))
            }
        }
        FieldType::Email => {
            if raw.to_string().validate_email() {
                Ok(raw.to_lowercase().into())
            } else {
                Err(format!("{field} must be a valid email address"))
            }
        }
        FieldType::Date => chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|d| d.format("%Y-%m-%d").to_string().into())
            .map_err(|_| format!("{field} must be a date (YYYY-MM-DD)")),
        FieldType::Select => {
            if let Some(options) = descriptor.options.as_ref().filter(|o| !o.is_empty()) {
                if !options.iter().any(|o| o.id == raw) {
                    return Err(format!("{field} has an unknown option '{raw}'"));
                }
            }
            // Numeric option ids are foreign keys or status ids.
            Ok(raw
                .parse::<i64>()
                .map(serde_json::Value::from)
                .unwrap_or_else(|_| raw.into()))
        }
        FieldType::Boolean => parse_bool(raw)
            .map(serde_json::Value::Bool)
            .ok_or_else(|| format!("{field} must be true or false")),
        FieldType::Text | FieldType::Textarea | FieldType::Password | FieldType::File => {
            Ok(raw.into())
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::fields::introspect;
    use crate::schemas;

    fn body(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn method_selects_intent() {
        assert_eq!(FormMethod::Post.intent(), FormIntent::Create);
        assert_eq!(FormMethod::Patch.intent(), FormIntent::Update);
        assert_eq!(FormMethod::parse("delete"), Some(FormMethod::Delete));
        assert_eq!(FormMethod::parse("PUT"), None);
    }

    #[test]
    fn render_prefills_from_record_then_default() {
        let descriptors = introspect(&schemas::RATING);
        let record = serde_json::json!({ "clientId": 7, "ratingYear": 2025, "statusId": null });
        let form = render_form("/ratings/3", FormMethod::Patch, &descriptors, Some(&record));

        assert_eq!(form.input("clientId").unwrap().value, Some(serde_json::json!("7")));
        assert_eq!(form.input("ratingYear").unwrap().value, Some(serde_json::json!(2025)));
        // Null on the record falls back to the schema default.
        assert_eq!(form.input("statusId").unwrap().value, Some(serde_json::json!("1")));
        assert_eq!(form.input("ratingScore").unwrap().value, None);
    }

    #[test]
    fn password_is_never_prefilled() {
        let descriptors = introspect(&schemas::USER);
        let record = serde_json::json!({ "password": "leak", "email": "a@b.co" });
        let form = render_form("/users/1", FormMethod::Patch, &descriptors, Some(&record));
        assert_eq!(form.input("password").unwrap().value, None);
        assert_eq!(form.input("email").unwrap().label, "Email");
    }

    #[test]
    fn hidden_fields_are_included_in_submission() {
        let descriptors = introspect(&schemas::INDUSTRY);
        let form = render_form("/industries", FormMethod::Post, &descriptors, None)
            .with_hidden("clientId", 42);
        let submission = form.submission(&body(&[("name", "Banking")]));

        assert_eq!(submission.method, FormMethod::Post);
        assert!(submission.body.contains(&("name".into(), "Banking".into())));
        assert!(submission.body.contains(&("description".into(), String::new())));
        assert!(submission.body.contains(&("clientId".into(), "42".into())));
    }

    #[test]
    fn credential_pairs_grow_without_reintrospection() {
        let descriptors = introspect(&schemas::CLIENT);
        let mut form = render_form("/clients", FormMethod::Post, &descriptors, None);
        let before = form.inputs.len();

        assert_eq!(form.append_credential_pair(), 1);
        assert_eq!(form.append_credential_pair(), 2);
        assert_eq!(form.inputs.len(), before + 4);
        assert_eq!(form.input("loginPassword2").unwrap().input_type, FieldType::Password);
    }

    #[test]
    fn collect_credential_pairs_orders_and_skips_incomplete() {
        let pairs = collect_credential_pairs(&body(&[
            ("loginEmail2", "second@acme.io"),
            ("loginPassword2", "pw-two-long"),
            ("loginEmail1", "first@acme.io"),
            ("loginPassword1", "pw-one-long"),
            ("loginEmail3", "third@acme.io"),
        ]));
        assert_eq!(
            pairs,
            vec![
                ("first@acme.io".to_string(), "pw-one-long".to_string()),
                ("second@acme.io".to_string(), "pw-two-long".to_string()),
            ]
        );
    }

    #[test]
    fn humanize_labels() {
        assert_eq!(humanize("companyName"), "Company Name");
        assert_eq!(humanize("industryId"), "Industry");
        assert_eq!(humanize("loginEmail2"), "Login Email 2");
        assert_eq!(humanize("id"), "Id");
    }

    #[test]
    fn parse_create_converts_types_and_applies_defaults() {
        let descriptors = introspect(&schemas::RATING);
        let values = parse_submission(
            &descriptors,
            &body(&[
                ("clientId", "5"),
                ("ratingYear", "2026"),
                ("outlook", "stable"),
                ("startDate", "2026-02-01"),
                ("unrelated", "ignored"),
            ]),
            SubmissionMode::Create,
        )
        .unwrap();

        assert_eq!(values["clientId"], 5);
        assert_eq!(values["ratingYear"], 2026);
        assert_eq!(values["statusId"], 1);
        assert_eq!(values["outlook"], "stable");
        assert_eq!(values["startDate"], "2026-02-01");
        assert!(!values.contains_key("unrelated"));
        assert!(!values.contains_key("ratingScore"));
    }

    #[test]
    fn parse_create_reports_all_field_errors() {
        let descriptors = introspect(&schemas::CLIENT);
        let err = parse_submission(
            &descriptors,
            &body(&[("email", "not-an-email")]),
            SubmissionMode::Create,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) => {
            assert!(msg.contains("companyName is required"));
            assert!(msg.contains("email must be a valid email address"));
        });
    }

    #[test]
    fn parse_update_leaves_absent_fields_out() {
        let descriptors = introspect(&schemas::USER);
        let values = parse_submission(
            &descriptors,
            &body(&[("lastName", "Okafor")]),
            SubmissionMode::Update,
        )
        .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["lastName"], "Okafor");
    }

    #[test]
    fn parse_update_clears_blank_optional_fields() {
        let descriptors = introspect(&schemas::RATING);
        let values = parse_submission(
            &descriptors,
            &body(&[("secondaryAnalystId", ""), ("endDate", "  "), ("ratingScore", "AA")]),
            SubmissionMode::Update,
        )
        .unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values["secondaryAnalystId"], serde_json::Value::Null);
        assert_eq!(values["endDate"], serde_json::Value::Null);
        assert_eq!(values["ratingScore"], "AA");
    }

    #[test]
    fn parse_update_keeps_password_when_blank() {
        let descriptors = introspect(&schemas::USER);
        let values = parse_submission(
            &descriptors,
            &body(&[("password", ""), ("firstName", "Nia")]),
            SubmissionMode::Update,
        )
        .unwrap();
        assert!(!values.contains_key("password"));
        assert_eq!(values["firstName"], "Nia");
    }

    #[test]
    fn checkbox_on_update_is_changed_only_when_sent() {
        let descriptors = introspect(&schemas::USER);
        let absent = parse_submission(&descriptors, &body(&[]), SubmissionMode::Update).unwrap();
        assert!(!absent.contains_key("isActive"));

        for unchecked in ["", "false", "off"] {
            let values = parse_submission(
                &descriptors,
                &body(&[("isActive", unchecked)]),
                SubmissionMode::Update,
            )
            .unwrap();
            assert_eq!(values["isActive"], false, "{unchecked:?}");
        }
    }

    #[test]
    fn parse_update_rejects_blanked_required_field() {
        let descriptors = introspect(&schemas::INDUSTRY);
        let err = parse_submission(&descriptors, &body(&[("name", "  ")]), SubmissionMode::Update)
            .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg == "name is required");
    }

    #[test]
    fn parse_rejects_unknown_static_option() {
        let descriptors = introspect(&schemas::RATING);
        let err = parse_submission(
            &descriptors,
            &body(&[("clientId", "1"), ("ratingYear", "2026"), ("statusId", "9")]),
            SubmissionMode::Create,
        )
        .unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("statusId has an unknown option"));
    }

    #[test]
    fn unchecked_checkbox_defaults_on_create() {
        let descriptors = introspect(&schemas::USER);
        let values = parse_submission(
            &descriptors,
            &body(&[
                ("firstName", "Ada"),
                ("lastName", "Obi"),
                ("email", "Ada@Firm.com"),
            ]),
            SubmissionMode::Create,
        )
        .unwrap();
        assert_eq!(values["isActive"], true);
        assert_eq!(values["role"], "analyst");
        assert_eq!(values["email"], "ada@firm.com");
    }

    #[test]
    fn into_dto_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Dto {
            #[allow(dead_code)]
            count: i64,
        }
        let mut values = serde_json::Map::new();
        values.insert("count".into(), "many".into());
        assert_matches!(into_dto::<Dto>(values), Err(CoreError::Validation(_)));
    }
}
