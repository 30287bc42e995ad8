//! Last-fetched-page cache and list view lifecycle.
//!
//! A [`ListView`] owns the [`QueryStore`] snapshot of one entity list. On
//! mount (or any parameter change) it enters `Loading` and hands back the
//! cached snapshot immediately; the authoritative fetch then resolves it to
//! `Loaded` or `Errored`. An error keeps serving the previous snapshot with
//! the error attached.
//!
//! Instances are owned by an explicit, session-scoped container in the API
//! layer; nothing here is global.

use crate::notice::Notice;
use crate::pagination::{ListQuery, ListResult};

/// Holder of the last fetched page. Writes replace the snapshot wholesale.
#[derive(Debug, Clone)]
pub struct QueryStore<T> {
    snapshot: Option<ListResult<T>>,
}

impl<T> Default for QueryStore<T> {
    fn default() -> Self {
        Self { snapshot: None }
    }
}

impl<T: Clone> QueryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query_data(&mut self, data: ListResult<T>) {
        self.snapshot = Some(data);
    }

    pub fn store_query_data(&self) -> Option<&ListResult<T>> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }
}

/// Lifecycle state of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListViewState {
    Idle,
    Loading,
    Loaded,
    Errored(String),
}

/// What a resolved fetch produced for the caller to render.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// Fresh data on success; the stale snapshot (with `error` set) on
    /// failure; `None` when failing with nothing cached.
    pub data: Option<ListResult<T>>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone)]
pub struct ListView<T> {
    entity: &'static str,
    store: QueryStore<T>,
    state: ListViewState,
    query: Option<ListQuery>,
}

impl<T: Clone> ListView<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            store: QueryStore::new(),
            state: ListViewState::Idle,
            query: None,
        }
    }

    pub fn state(&self) -> &ListViewState {
        &self.state
    }

    pub fn query(&self) -> Option<&ListQuery> {
        self.query.as_ref()
    }

    pub fn store(&self) -> &QueryStore<T> {
        &self.store
    }

    /// Start loading for `query` and return the cached snapshot, if any, so
    /// the caller can render without an empty-state flash.
    ///
    /// Used both on first mount and on every parameter change.
    pub fn begin(&mut self, query: ListQuery) -> Option<ListResult<T>> {
        self.state = ListViewState::Loading;
        self.query = Some(query);
        self.store.store_query_data().cloned()
    }

    /// Settle the pending fetch.
    pub fn resolve(&mut self, outcome: Result<ListResult<T>, String>) -> Resolved<T> {
        match outcome {
            Ok(data) => {
                self.state = ListViewState::Loaded;
                self.store.set_query_data(data.clone());
                Resolved {
                    data: Some(data),
                    notice: None,
                }
            }
            Err(message) => {
                self.state = ListViewState::Errored(message.clone());
                let stale = self
                    .store
                    .store_query_data()
                    .cloned()
                    .map(|snapshot| snapshot.with_error(message.clone()));
                Resolved {
                    data: stale,
                    notice: Some(Notice::error(format!("{}-list", self.entity), message)),
                }
            }
        }
    }
}
