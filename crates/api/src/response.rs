//! Shared response envelope types for API handlers.
//!
//! Reads answer with `{ "data": ... }`; actions (create, update, delete,
//! upload, login) answer with `{ "success": true, "message", "data" }`.
//! Failures of either kind are rendered by [`AppError`](crate::error::AppError)
//! as `{ "success": false, "error", "code" }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Outcome of an action endpoint.
#[derive(Debug, Serialize)]
pub struct ActionResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ActionResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ActionResponse<()> {
    /// A successful action with nothing to return but a message.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}
