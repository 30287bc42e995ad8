use std::sync::Arc;

use rms_cloud::{ObjectStore, StorageError};
use rms_core::crypto::SessionCipher;
use rms_events::Mailer;

use crate::config::ServerConfig;
use crate::session::registry::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: rms_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Seals and opens the session and settings cookies.
    pub cipher: Arc<SessionCipher>,
    /// Per-session list caches and notice boards.
    pub sessions: Arc<SessionRegistry>,
    /// Object storage; `None` when no backend is configured.
    pub storage: Option<Arc<dyn ObjectStore>>,
    pub mailer: Arc<Mailer>,
    /// Outbound HTTP client (questionnaire template downloads).
    pub http: reqwest::Client,
}

impl AppState {
    /// The configured object storage, or [`StorageError::NotConfigured`].
    pub fn storage(&self) -> Result<&dyn ObjectStore, StorageError> {
        self.storage.as_deref().ok_or(StorageError::NotConfigured)
    }
}
