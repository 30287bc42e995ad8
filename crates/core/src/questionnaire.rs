//! Questionnaire records, templates, grouping and the section viewer.
//!
//! A rating carries a flat list of [`QuestionRecord`]s instantiated from its
//! questionnaire template. The viewer groups them by section header (in
//! first-seen order) and shows one section at a time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuestionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl QuestionResponse {
    /// A file reference that is present and non-blank.
    pub fn file_reference(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuestionRecord {
    /// Section key.
    pub header: String,
    pub question: String,
    #[serde(default)]
    pub sub_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<QuestionResponse>,
}

/// Fields of a response to overwrite. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseUpdate {
    pub text: Option<String>,
    pub file_url: Option<String>,
}

/// Overwrite the response of `question` in place.
///
/// Responses are never removed; only the supplied parts are replaced.
pub fn apply_response(
    records: &mut [QuestionRecord],
    question: &str,
    update: ResponseUpdate,
) -> Result<(), CoreError> {
    let record = records
        .iter_mut()
        .find(|r| r.question == question)
        .ok_or_else(|| CoreError::Validation(format!("Unknown question '{question}'")))?;

    let response = record.response.get_or_insert_with(QuestionResponse::default);
    if let Some(text) = update.text {
        response.text = Some(text);
    }
    if let Some(file_url) = update.file_url {
        response.file_url = Some(file_url);
    }
    Ok(())
}

/// Whether any question other than `except` has `url` as its file reference.
pub fn references_file(records: &[QuestionRecord], url: &str, except: Option<&str>) -> bool {
    records
        .iter()
        .filter(|record| Some(record.question.as_str()) != except)
        .filter_map(|record| record.response.as_ref()?.file_reference())
        .any(|reference| reference == url)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateQuestion {
    pub question: String,
    #[serde(default)]
    pub sub_questions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSection {
    pub header: String,
    #[serde(default)]
    pub questions: Vec<TemplateQuestion>,
}

/// A questionnaire template as stored at the questionnaire's template URL.
///
/// Either `{"sections": [{"header", "questions": [...]}]}` or a flat array of
/// question records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuestionnaireTemplate {
    Sectioned { sections: Vec<TemplateSection> },
    Flat(Vec<QuestionRecord>),
}

impl QuestionnaireTemplate {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("Invalid questionnaire template: {e}")))
    }

    /// Instantiate fresh, unanswered records for a new rating.
    pub fn instantiate(self) -> Vec<QuestionRecord> {
        match self {
            Self::Sectioned { sections } => sections
                .into_iter()
                .flat_map(|section| {
                    let header = section.header;
                    section.questions.into_iter().map(move |q| QuestionRecord {
                        header: header.clone(),
                        question: q.question,
                        sub_questions: q.sub_questions,
                        response: None,
                    })
                })
                .collect(),
            Self::Flat(records) => records
                .into_iter()
                .map(|r| QuestionRecord {
                    response: None,
                    ..r
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Records bucketed by header, in first-seen header order.
pub type GroupedQuestions = IndexMap<String, Vec<QuestionRecord>>;

pub fn group_by_header(records: impl IntoIterator<Item = QuestionRecord>) -> GroupedQuestions {
    let mut grouped = GroupedQuestions::new();
    for record in records {
        grouped.entry(record.header.clone()).or_default().push(record);
    }
    grouped
}

/// Inverse of [`group_by_header`].
pub fn flatten(grouped: GroupedQuestions) -> Vec<QuestionRecord> {
    grouped.into_values().flatten().collect()
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewerMode {
    #[default]
    ReadOnly,
    Edit,
}

/// Viewer input: already grouped, or flat and grouped on construction.
#[derive(Debug, Clone)]
pub enum ViewerInput {
    Grouped(GroupedQuestions),
    Flat(Vec<QuestionRecord>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTab {
    pub header: String,
    pub active: bool,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextControl {
    pub value: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub question: String,
    pub sub_questions: Vec<String>,
    pub text: TextControl,
    /// Upload trigger; only present in edit mode.
    pub upload_enabled: bool,
    /// Target of the "View" control; present only with a file reference.
    pub view_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub mode: ViewerMode,
    pub tabs: Vec<SectionTab>,
    pub active_header: Option<String>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone)]
pub struct QuestionnaireViewer {
    groups: GroupedQuestions,
    active: Option<String>,
    mode: ViewerMode,
}

impl QuestionnaireViewer {
    pub fn new(input: ViewerInput, mode: ViewerMode) -> Self {
        let groups = match input {
            ViewerInput::Grouped(groups) => groups,
            ViewerInput::Flat(records) => group_by_header(records),
        };
        let active = groups.keys().next().cloned();
        Self {
            groups,
            active,
            mode,
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn active_header(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Swap the active section. Unknown headers leave it unchanged.
    pub fn select(&mut self, header: &str) -> bool {
        if self.groups.contains_key(header) {
            self.active = Some(header.to_string());
            true
        } else {
            false
        }
    }

    pub fn active_questions(&self) -> &[QuestionRecord] {
        self.active
            .as_ref()
            .and_then(|h| self.groups.get(h))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn render(&self) -> SectionView {
        let editable = self.mode == ViewerMode::Edit;
        let questions = self
            .active_questions()
            .iter()
            .map(|record| {
                let response = record.response.as_ref();
                QuestionView {
                    question: record.question.clone(),
                    sub_questions: record.sub_questions.clone(),
                    text: TextControl {
                        value: response.and_then(|r| r.text.clone()),
                        enabled: editable,
                    },
                    upload_enabled: editable,
                    view_url: response
                        .and_then(QuestionResponse::file_reference)
                        .map(str::to_string),
                }
            })
            .collect();

        SectionView {
            mode: self.mode,
            tabs: self
                .groups
                .iter()
                .map(|(header, records)| SectionTab {
                    header: header.clone(),
                    active: self.active.as_deref() == Some(header.as_str()),
                    count: records.len(),
                })
                .collect(),
            active_header: self.active.clone(),
            questions,
        }
    }

    /// Hand an upload for `question` to `upload`, keyed by the question text.
    ///
    /// The viewer never uploads itself. Read-only viewers refuse.
    pub fn request_upload<R>(
        &self,
        question: &str,
        upload: impl FnOnce(&str) -> R,
    ) -> Result<R, CoreError> {
        if self.mode != ViewerMode::Edit {
            return Err(CoreError::Forbidden(
                "Questionnaire is read-only".to_string(),
            ));
        }
        let known = self
            .groups
            .values()
            .flatten()
            .any(|record| record.question == question);
        if !known {
            return Err(CoreError::Validation(format!("Unknown question '{question}'")));
        }
        Ok(upload(question))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
