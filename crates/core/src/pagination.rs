//! List queries, page metadata and list results.
//!
//! Every list view in the system is driven by the same four query parameters
//! (`search`, `page`, `limit`, `sort`). [`ListQuery`] normalizes them and
//! [`PageMeta`] derives the pager state from the total row count.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_PAGE: i64 = 1;

/// Rows per page when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Page sizes offered by the page-size control.
pub const PAGE_SIZE_OPTIONS: &[i64] = &[15, 30, 50];

/// Upper bound accepted for `limit`.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Highest page a query may ask for; keeps `page * limit` within `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PAGE_SIZE;

// ---------------------------------------------------------------------------
// PageMeta
// ---------------------------------------------------------------------------

/// Pagination state of one list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_docs: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    /// Derive page metadata. Out-of-range inputs are clamped
    /// (`page >= 1`, `limit >= 1`, `total_docs >= 0`).
    pub fn new(page: i64, limit: i64, total_docs: i64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let total_docs = total_docs.max(0);
        Self {
            page,
            limit,
            total_docs,
            has_next_page: page.saturating_mul(limit) < total_docs,
            has_prev_page: page > 1,
        }
    }

    pub fn total_pages(&self) -> i64 {
        self.total_docs.saturating_add(self.limit - 1) / self.limit
    }

    /// One-based inclusive row range shown on this page.
    ///
    /// An empty page reports `(0, 0)`.
    pub fn range(&self) -> (i64, i64) {
        let upper = self.page.saturating_mul(self.limit);
        let end = self.total_docs.min(upper);
        let start = upper.saturating_sub(self.limit).saturating_add(1);
        if start > end {
            (0, 0)
        } else {
            (start, end)
        }
    }

    /// Pager caption, e.g. `"16 - 22 of 22"`.
    pub fn page_info(&self) -> String {
        let (start, end) = self.range();
        format!("{start} - {end} of {}", self.total_docs)
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A `column:direction` sort parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `column:direction`. A bare column sorts ascending; an
    /// unrecognised direction yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (column, direction) = match raw.split_once(':') {
            Some((c, d)) => (c.trim(), d.trim()),
            None => (raw.trim(), "asc"),
        };
        if column.is_empty() {
            return None;
        }
        let direction = match direction.to_ascii_lowercase().as_str() {
            "asc" | "1" => SortDirection::Asc,
            "desc" | "-1" => SortDirection::Desc,
            _ => return None,
        };
        Some(Self {
            column: column.to_string(),
            direction,
        })
    }

    pub fn to_param(&self) -> String {
        format!("{}:{}", self.column, self.direction.as_param())
    }

    /// Translate to an `ORDER BY` fragment using a `(param, sql column)` whitelist.
    pub fn to_sql(&self, whitelist: &[(&str, &str)]) -> Option<String> {
        whitelist
            .iter()
            .find(|(param, _)| *param == self.column)
            .map(|(_, column)| format!("{column} {}", self.direction.as_sql()))
    }
}

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// Normalized list query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: i64,
    pub limit: i64,
    pub sort: Option<SortSpec>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl ListQuery {
    /// Normalize raw parameters: blank search is dropped, `page` is clamped to
    /// `1..=MAX_PAGE`, `limit` to `1..=MAX_PAGE_SIZE`, and an unparsable sort
    /// is ignored.
    pub fn new(
        search: Option<&str>,
        page: Option<i64>,
        limit: Option<i64>,
        sort: Option<&str>,
    ) -> Self {
        Self {
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            page: page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort: sort.and_then(SortSpec::parse),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ILIKE` pattern for a contains-match on the search term, with LIKE
    /// wildcards in the term escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_ref().map(|term| {
            let escaped = term
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{escaped}%")
        })
    }

    /// `ORDER BY` fragment from the sort parameter, or `default` when the
    /// parameter is absent or names a column outside `whitelist`.
    pub fn order_by(&self, whitelist: &[(&str, &str)], default: &str) -> String {
        self.sort
            .as_ref()
            .and_then(|s| s.to_sql(whitelist))
            .unwrap_or_else(|| default.to_string())
    }

    pub fn meta(&self, total_docs: i64) -> PageMeta {
        PageMeta::new(self.page, self.limit, total_docs)
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page.clamp(1, MAX_PAGE);
        self
    }

    /// Change the page size. Always returns to page 1 so the current page
    /// cannot fall out of range.
    pub fn with_page_size(mut self, limit: i64) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self.page = DEFAULT_PAGE;
        self
    }

    /// Replace the search term and return to page 1.
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_string());
        self.page = DEFAULT_PAGE;
        self
    }

    /// Encode as a URL query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        if let Some(search) = &self.search {
            serializer.append_pair("search", search);
        }
        serializer.append_pair("page", &self.page.to_string());
        serializer.append_pair("limit", &self.limit.to_string());
        if let Some(sort) = &self.sort {
            serializer.append_pair("sort", &sort.to_param());
        }
        serializer.finish()
    }
}

// ---------------------------------------------------------------------------
// ListResult
// ---------------------------------------------------------------------------

/// One page of rows plus the metadata a list view needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T> {
    /// Column keys, in display order.
    pub thead: Vec<String>,
    pub tbody: Vec<T>,
    pub meta: PageMeta,
    pub search_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ListResult<T> {
    pub fn new(columns: &[&str], rows: Vec<T>, meta: PageMeta, search_title: &str) -> Self {
        Self {
            thead: columns.iter().map(|c| c.to_string()).collect(),
            tbody: rows,
            meta,
            search_title: search_title.to_string(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn huge_page_is_capped() {
        let query = ListQuery::new(None, Some(i64::MAX), None, None);
        assert_eq!(query.page, MAX_PAGE);
        assert!(query.offset() > 0);
        assert_eq!(query.meta(10).page_info(), "0 - 0 of 10");

        let query = ListQuery::default().with_page(i64::MAX);
        assert_eq!(query.page, MAX_PAGE);
        assert!(query.offset() > 0);
    }

    #[test]
    fn meta_saturates_on_unclamped_input() {
        let meta = PageMeta::new(i64::MAX, 50, 100);
        assert_eq!(meta.page_info(), "0 - 0 of 100");
        assert!(!meta.has_next_page);

        let meta = PageMeta::new(1, i64::MAX, i64::MAX);
        assert_eq!(meta.total_pages(), 1);
        assert_eq!(meta.range(), (1, i64::MAX));
    }

    #[test]
    fn second_partial_page() {
        let meta = PageMeta::new(2, 15, 22);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
        assert_eq!(meta.page_info(), "16 - 22 of 22");
        assert_eq!(meta.total_pages(), 2);
    }

    #[test]
    fn flags_follow_invariants() {
        for (page, limit, total) in [(1, 15, 0), (1, 15, 15), (1, 15, 16), (3, 10, 30), (3, 10, 31)] {
            let meta = PageMeta::new(page, limit, total);
            assert_eq!(meta.has_next_page, page * limit < total, "{page}/{limit}/{total}");
            assert_eq!(meta.has_prev_page, page > 1);
        }
    }

    #[test]
    fn empty_result_page_info() {
        assert_eq!(PageMeta::new(1, 15, 0).page_info(), "0 - 0 of 0");
    }

    #[test]
    fn query_defaults_and_clamping() {
        let q = ListQuery::new(Some("   "), Some(0), Some(500), Some("name:sideways"));
        assert_eq!(q.search, None);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, MAX_PAGE_SIZE);
        assert_eq!(q.sort, None);
        assert_eq!(ListQuery::new(None, None, None, None), ListQuery::default());
    }

    #[test]
    fn page_size_change_resets_page() {
        let q = ListQuery::new(None, Some(4), Some(15), None).with_page_size(30);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 30);
        assert!(q.to_query_string().contains("page=1"));
    }

    #[test]
    fn search_change_resets_page() {
        let q = ListQuery::default().with_page(3).with_search("acme & co");
        assert_eq!(q.page, 1);
        assert_eq!(q.to_query_string(), "search=acme+%26+co&page=1&limit=15");
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let q = ListQuery::new(Some("50%_off"), None, None, None);
        assert_eq!(q.search_pattern().as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn order_by_uses_whitelist() {
        let whitelist = [("companyName", "company_name"), ("createdAt", "created_at")];
        let q = ListQuery::new(None, None, None, Some("companyName:desc"));
        assert_eq!(q.order_by(&whitelist, "created_at DESC"), "company_name DESC");

        let injected = ListQuery::new(None, None, None, Some("1;drop table clients:asc"));
        assert_eq!(injected.order_by(&whitelist, "created_at DESC"), "created_at DESC");
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(ListQuery::new(None, Some(3), Some(30), None).offset(), 60);
    }
}
