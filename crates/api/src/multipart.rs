//! Multipart upload intake.
//!
//! The file part is streamed chunk by chunk into a temporary file and cut off
//! as soon as it passes the cap of its [`UploadKind`]; text parts are kept in
//! memory. The temp file is removed when the [`SpooledFile`] is dropped.

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::extract::DefaultBodyLimit;
use rms_core::error::CoreError;
use rms_core::storage_key::{validate_upload, UploadKind, DOCUMENT_MAX_BYTES};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

/// Name of the multipart part carrying the file.
pub const FILE_FIELD: &str = "file";

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Body limit of upload routes: the largest per-kind cap plus room for the
/// multipart envelope. The per-kind cap itself is enforced while spooling.
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(DOCUMENT_MAX_BYTES + 1024 * 1024)
}

/// An uploaded file, spooled to disk.
#[derive(Debug)]
pub struct SpooledFile {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    pub path: TempPath,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    /// Non-file parts by name.
    pub fields: HashMap<String, String>,
    pub file: Option<SpooledFile>,
}

impl UploadForm {
    /// The spooled file, or a 400 when the form carried none.
    pub fn require_file(&mut self) -> AppResult<SpooledFile> {
        self.file
            .take()
            .ok_or_else(|| AppError::BadRequest(format!("Missing required '{FILE_FIELD}' field")))
    }

    /// A trimmed, non-blank text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Read every part of `multipart`, spooling the file part under the cap of
/// `kind` and checking its name and size against the rules of `kind`.
pub async fn read_upload(mut multipart: Multipart, kind: UploadKind) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            if form.file.is_some() {
                return Err(AppError::BadRequest("Only one file may be uploaded".into()));
            }
            let file = spool(field, kind).await?;
            validate_upload(kind, &file.file_name, file.size)?;
            form.file = Some(file);
        } else {
            let text = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}

async fn spool(mut field: Field<'_>, kind: UploadKind) -> AppResult<SpooledFile> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Uploaded file has no name".into()))?;
    let content_type = field
        .content_type()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();

    let (std_file, path) = tempfile::NamedTempFile::new()
        .map_err(|e| AppError::InternalError(format!("Failed to create temp file: {e}")))?
        .into_parts();
    let mut file = tokio::fs::File::from_std(std_file);

    let mut size = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len();
        if size > kind.max_bytes() {
            tracing::debug!(file_name = %file_name, kind = kind.as_str(), "Upload over size cap");
            return Err(AppError::Core(CoreError::Validation(format!(
                "File exceeds the {} MB limit for {} uploads",
                kind.max_bytes() / (1024 * 1024),
                kind.as_str()
            ))));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to spool upload: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to spool upload: {e}")))?;

    Ok(SpooledFile {
        file_name,
        content_type,
        size,
        path,
    })
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::BadRequest(err.body_text())
}
