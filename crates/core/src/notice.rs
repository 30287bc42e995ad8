//! Transient user notices (toasts).
//!
//! Each action pushes at most one notice under a stable id. Pushing again with
//! the same id replaces the queued notice, so repeated submissions never stack
//! duplicates.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notice {
    /// Stable identifier of the action that raised the notice.
    pub id: String,
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Queue of pending notices, deduplicated by id.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    pending: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `notice`, replacing a pending notice with the same id in place.
    pub fn push(&mut self, notice: Notice) {
        match self.pending.iter_mut().find(|n| n.id == notice.id) {
            Some(existing) => *existing = notice,
            None => self.pending.push(notice),
        }
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_id_replaces_instead_of_stacking() {
        let mut board = NoticeBoard::new();
        board.push(Notice::error("client-create", "Email already used"));
        board.push(Notice::info("rating-upload", "Uploading"));
        board.push(Notice::success("client-create", "Client created"));

        let notices = board.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].id, "client-create");
        assert_eq!(notices[0].level, NoticeLevel::Success);
        assert!(board.is_empty());
    }
}
