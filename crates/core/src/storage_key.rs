//! Object-storage keys and upload rules.
//!
//! Keys have the shape `{entityId}/{sanitized-filename}.{ext}`, lower-cased,
//! so every object is scoped under the entity that owns it. Deletion takes the
//! same key shape.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::DbId;

/// Receipts and invoices (multipart temp-file handler cap).
pub const RECEIPT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Generic drag-and-drop documents and questionnaire attachments.
pub const DOCUMENT_MAX_BYTES: usize = 30 * 1024 * 1024;

const FINANCIAL_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg"];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "csv", "ppt", "pptx", "txt", "png", "jpg", "jpeg", "zip",
];

static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// What an upload is for. Decides size cap, accepted extensions and who may
/// upload it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Receipt,
    Invoice,
    Document,
    QuestionAttachment,
}

impl UploadKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "receipt" => Some(Self::Receipt),
            "invoice" => Some(Self::Invoice),
            "document" => Some(Self::Document),
            "question" => Some(Self::QuestionAttachment),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Invoice => "invoice",
            Self::Document => "document",
            Self::QuestionAttachment => "question",
        }
    }

    pub fn max_bytes(self) -> usize {
        match self {
            Self::Receipt | Self::Invoice => RECEIPT_MAX_BYTES,
            Self::Document | Self::QuestionAttachment => DOCUMENT_MAX_BYTES,
        }
    }

    pub fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Receipt | Self::Invoice => FINANCIAL_EXTENSIONS,
            Self::Document | Self::QuestionAttachment => DOCUMENT_EXTENSIONS,
        }
    }

    /// Receipts and invoices may only be uploaded by the rating's assigned staff.
    pub fn requires_rating_actor(self) -> bool {
        matches!(self, Self::Receipt | Self::Invoice)
    }
}

/// Split `filename` into `(stem, extension)`; the extension is lower-cased.
pub fn split_extension(filename: &str) -> (&str, Option<String>) {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem, Some(ext.to_ascii_lowercase()))
        }
        _ => (base, None),
    }
}

/// Lower-case `stem` and collapse every run of non-alphanumerics into `-`.
pub fn sanitize_stem(stem: &str) -> String {
    let lowered = stem.to_lowercase();
    let collapsed = NON_ALNUM_RE.replace_all(&lowered, "-");
    let trimmed = collapsed.trim_matches('-');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Build the storage key of `filename` owned by entity `entity_id`.
pub fn object_key(entity_id: DbId, filename: &str) -> String {
    let (stem, ext) = split_extension(filename);
    let stem = sanitize_stem(stem);
    match ext {
        Some(ext) => format!("{entity_id}/{stem}.{ext}"),
        None => format!("{entity_id}/{stem}"),
    }
}

/// Check extension and size of an upload against its kind.
pub fn validate_upload(kind: UploadKind, filename: &str, size: usize) -> Result<(), CoreError> {
    let (_, ext) = split_extension(filename);
    let ext = ext.ok_or_else(|| {
        CoreError::Validation(format!("File '{filename}' has no extension"))
    })?;
    if !kind.allowed_extensions().contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported {} format '.{ext}'. Allowed: {}",
            kind.as_str(),
            kind.allowed_extensions().join(", ")
        )));
    }
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if size > kind.max_bytes() {
        return Err(CoreError::Validation(format!(
            "File exceeds the {} MB limit for {} uploads",
            kind.max_bytes() / (1024 * 1024),
            kind.as_str()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn keys_are_entity_scoped_and_lowercase() {
        assert_eq!(object_key(42, "Q3 Receipt (Final).PDF"), "42/q3-receipt-final.pdf");
        assert_eq!(object_key(7, "../../etc/passwd"), "7/passwd");
        assert_eq!(object_key(7, "###.docx"), "7/file.docx");
        assert_eq!(object_key(7, "README"), "7/readme");
    }

    #[test]
    fn split_extension_handles_dotfiles() {
        assert_eq!(split_extension(".env"), (".env", None));
        assert_eq!(split_extension("a.tar.GZ"), ("a.tar", Some("gz".into())));
    }

    #[test]
    fn receipts_are_capped_at_five_megabytes() {
        assert!(validate_upload(UploadKind::Receipt, "r.pdf", RECEIPT_MAX_BYTES).is_ok());
        assert_matches!(
            validate_upload(UploadKind::Receipt, "r.pdf", RECEIPT_MAX_BYTES + 1),
            Err(CoreError::Validation(msg)) if msg.contains("5 MB")
        );
        assert!(validate_upload(UploadKind::Document, "big.zip", RECEIPT_MAX_BYTES + 1).is_ok());
    }

    #[test]
    fn extensions_are_checked_per_kind() {
        assert_matches!(
            validate_upload(UploadKind::Invoice, "invoice.xlsx", 10),
            Err(CoreError::Validation(_))
        );
        assert!(validate_upload(UploadKind::Document, "model.xlsx", 10).is_ok());
        assert_matches!(
            validate_upload(UploadKind::Document, "noext", 10),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn only_financial_uploads_require_actor() {
        assert!(UploadKind::Receipt.requires_rating_actor());
        assert!(UploadKind::Invoice.requires_rating_actor());
        assert!(!UploadKind::Document.requires_rating_actor());
        assert_eq!(UploadKind::parse("invoice"), Some(UploadKind::Invoice));
        assert_eq!(UploadKind::parse("memo"), None);
    }
}
