//! Table view model for list pages.
//!
//! [`TableView::build`] turns a [`ListResult`] into rows of cells ordered by
//! `thead`, and [`Pager`] carries the pager controls. Neither triggers a
//! fetch: every control is a link to another query string, and the list
//! endpoint reacts to the navigation.

use serde::Serialize;

use crate::error::CoreError;
use crate::form::humanize;
use crate::pagination::{ListQuery, ListResult, PageMeta, PAGE_SIZE_OPTIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}

/// A page-size choice and the query string it navigates to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSizeLink {
    pub limit: i64,
    pub selected: bool,
    pub query: String,
}

/// Pager controls for one list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page_info: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub prev_query: Option<String>,
    pub next_query: Option<String>,
    pub page_sizes: Vec<PageSizeLink>,
}

impl Pager {
    pub fn build(meta: &PageMeta, query: &ListQuery) -> Self {
        let prev_query = meta
            .has_prev_page
            .then(|| query.clone().with_page(meta.page - 1).to_query_string());
        let next_query = meta
            .has_next_page
            .then(|| query.clone().with_page(meta.page + 1).to_query_string());

        let page_sizes = PAGE_SIZE_OPTIONS
            .iter()
            .map(|&limit| PageSizeLink {
                limit,
                selected: limit == meta.limit,
                query: query.clone().with_page_size(limit).to_query_string(),
            })
            .collect();

        Self {
            page_info: meta.page_info(),
            prev_disabled: !meta.has_prev_page,
            next_disabled: !meta.has_next_page,
            prev_query,
            next_query,
            page_sizes,
        }
    }
}

/// A list page rendered as a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView {
    pub columns: Vec<TableColumn>,
    pub rows: Vec<Vec<serde_json::Value>>,
    pub search_title: String,
    pub search: Option<String>,
    pub pager: Pager,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableView {
    /// Render `result` with cells in `thead` order. Keys missing from a row
    /// render as empty (`null`) cells.
    pub fn build<T: Serialize>(result: &ListResult<T>, query: &ListQuery) -> Result<Self, CoreError> {
        let rows = result
            .tbody
            .iter()
            .map(|row| {
                serde_json::to_value(row)
                    .map(|value| ordered_cells(&result.thead, &value))
                    .map_err(|e| CoreError::Internal(format!("Row serialization failed: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: result
                .thead
                .iter()
                .map(|key| TableColumn {
                    key: key.clone(),
                    label: humanize(key),
                })
                .collect(),
            rows,
            search_title: result.search_title.clone(),
            search: query.search.clone(),
            pager: Pager::build(&result.meta, query),
            error: result.error.clone(),
        })
    }
}

/// Pick `thead` keys out of a serialized row, in order.
pub fn ordered_cells(thead: &[String], row: &serde_json::Value) -> Vec<serde_json::Value> {
    thead
        .iter()
        .map(|key| row.get(key).cloned().unwrap_or(serde_json::Value::Null))
        .collect()
}
