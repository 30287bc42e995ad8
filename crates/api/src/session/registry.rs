//! Server-side, per-session state.
//!
//! Each signed-in session (keyed by its token's `jti`) owns the list caches
//! and the notice board of that browser session. Entries are created lazily,
//! dropped at logout, and pruned once their token has expired.
//!
//! A whole principal can be signed out at once with
//! [`SessionRegistry::revoke_subject`]: every token issued to it up to that
//! second is refused, so role and active status carried in older cookies stop
//! counting.

use std::collections::HashMap;
use std::sync::Arc;

use rms_core::list_cache::ListView;
use rms_core::notice::{Notice, NoticeBoard};
use rms_core::types::DbId;
use rms_db::models::client::ClientRow;
use rms_db::models::rating::RatingRow;
use tokio::sync::{Mutex, RwLock};

use crate::auth::jwt::Claims;

/// Cached list views, one per cached entity.
#[derive(Debug)]
pub struct EntityCaches {
    pub clients: ListView<ClientRow>,
    pub ratings: ListView<RatingRow>,
}

impl Default for EntityCaches {
    fn default() -> Self {
        Self {
            clients: ListView::new("clients"),
            ratings: ListView::new("ratings"),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub lists: EntityCaches,
    pub notices: NoticeBoard,
}

/// Row types whose list views are cached per session.
pub trait CachedList: Clone + Sized {
    fn list_view(state: &mut SessionState) -> &mut ListView<Self>;
}

impl CachedList for ClientRow {
    fn list_view(state: &mut SessionState) -> &mut ListView<Self> {
        &mut state.lists.clients
    }
}

impl CachedList for RatingRow {
    fn list_view(state: &mut SessionState) -> &mut ListView<Self> {
        &mut state.lists.ratings
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Principal kind and id, as carried in a token's `kind` and `sub`.
type Subject = (String, DbId);

#[derive(Debug)]
struct Entry {
    subject: Subject,
    /// Token expiry (UTC Unix timestamp).
    expires_at: i64,
    state: SharedSession,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Entry>>,
    /// Logged-out token ids mapped to their expiry.
    revoked: RwLock<HashMap<String, i64>>,
    /// Tokens of a subject issued at or before this time are refused.
    cutoffs: RwLock<HashMap<Subject, i64>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state of the session `claims` belongs to, created on first use.
    pub async fn session(&self, claims: &Claims) -> SharedSession {
        if let Some(existing) = self.sessions.read().await.get(&claims.jti) {
            return Arc::clone(&existing.state);
        }

        let now = chrono::Utc::now().timestamp();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, entry| entry.expires_at >= now);
        let entry = sessions.entry(claims.jti.clone()).or_insert_with(|| Entry {
            subject: (claims.kind.clone(), claims.sub),
            expires_at: claims.exp,
            state: Arc::new(Mutex::new(SessionState::default())),
        });
        Arc::clone(&entry.state)
    }

    /// Queue `notice` on the board of `claims`' session.
    pub async fn notify(&self, claims: &Claims, notice: Notice) {
        let session = self.session(claims).await;
        session.lock().await.notices.push(notice);
    }

    /// Drop the session and refuse its token from now on.
    pub async fn revoke(&self, claims: &Claims) {
        self.sessions.write().await.remove(&claims.jti);

        let now = chrono::Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp >= now);
        revoked.insert(claims.jti.clone(), claims.exp);
        tracing::debug!(jti = %claims.jti, "Session revoked");
    }

    /// Sign out every session of `kind`/`sub`, including tokens that have
    /// not touched the registry yet.
    pub async fn revoke_subject(&self, kind: &str, sub: DbId) {
        let subject = (kind.to_string(), sub);
        let now = chrono::Utc::now().timestamp();
        self.sessions
            .write()
            .await
            .retain(|_, entry| entry.subject != subject);
        self.cutoffs.write().await.insert(subject, now);
        tracing::info!(kind, sub, "All sessions of subject revoked");
    }

    /// Whether `claims` were logged out or belong to a revoked subject.
    pub async fn is_revoked(&self, claims: &Claims) -> bool {
        if self.revoked.read().await.contains_key(&claims.jti) {
            return true;
        }
        self.cutoffs
            .read()
            .await
            .get(&(claims.kind.clone(), claims.sub))
            .is_some_and(|cutoff| claims.iat <= *cutoff)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
