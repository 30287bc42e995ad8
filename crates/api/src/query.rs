//! Shared query parameter types for API handlers.

use rms_core::pagination::ListQuery;
use rms_core::questionnaire::ViewerMode;
use serde::Deserialize;

use crate::error::AppError;

/// List parameters (`?search=&page=&limit=&sort=column:direction`).
///
/// Normalized by [`ListQuery::new`]: page at least 1, limit clamped,
/// unknown sorts dropped.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
}

impl ListParams {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new(
            self.search.as_deref(),
            self.page,
            self.limit,
            self.sort.as_deref(),
        )
    }
}

/// Questionnaire viewer parameters (`?header=&mode=edit|view`).
#[derive(Debug, Default, Deserialize)]
pub struct ViewerParams {
    pub header: Option<String>,
    pub mode: Option<String>,
}

impl ViewerParams {
    /// Requested mode, or `default` when none was given.
    pub fn mode(&self, default: ViewerMode) -> Result<ViewerMode, AppError> {
        match self.mode.as_deref().map(str::trim) {
            None | Some("") => Ok(default),
            Some("edit") => Ok(ViewerMode::Edit),
            Some("view") | Some("read_only") => Ok(ViewerMode::ReadOnly),
            Some(other) => Err(AppError::BadRequest(format!(
                "Unknown viewer mode '{other}'. Expected: edit, view"
            ))),
        }
    }
}

/// Optional `?kind=` filter for document lists.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub kind: Option<String>,
}

/// `?logins=n` on the client create form: number of extra credential pairs.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialPairsParam {
    #[serde(default)]
    pub logins: usize,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn list_params_are_normalized() {
        let params = ListParams {
            search: Some("  ".into()),
            page: Some(0),
            limit: Some(500),
            sort: Some("companyName:desc".into()),
        };
        let query = params.to_query();
        assert_eq!(query.search, None);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
        assert!(query.sort.is_some());
    }

    #[test]
    fn viewer_mode_defaults_and_rejects_unknown() {
        let params = ViewerParams::default();
        assert_eq!(params.mode(ViewerMode::ReadOnly).unwrap(), ViewerMode::ReadOnly);

        let edit = ViewerParams {
            header: None,
            mode: Some("edit".into()),
        };
        assert_eq!(edit.mode(ViewerMode::ReadOnly).unwrap(), ViewerMode::Edit);

        let bogus = ViewerParams {
            header: None,
            mode: Some("admin".into()),
        };
        assert_matches!(bogus.mode(ViewerMode::Edit), Err(AppError::BadRequest(_)));
    }
}
