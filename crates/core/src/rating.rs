//! Rating workflow rules that do not need the database.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Staff assigned to a rating. Only they may attach receipts and invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingActors {
    pub supervisor_id: Option<DbId>,
    pub primary_analyst_id: Option<DbId>,
    pub secondary_analyst_id: Option<DbId>,
}

impl RatingActors {
    pub fn contains(&self, user_id: DbId) -> bool {
        [
            self.supervisor_id,
            self.primary_analyst_id,
            self.secondary_analyst_id,
        ]
        .into_iter()
        .flatten()
        .any(|id| id == user_id)
    }
}

/// Fail with [`CoreError::Forbidden`] unless `user_id` is one of `actors`.
pub fn ensure_rating_actor(actors: &RatingActors, user_id: DbId) -> Result<(), CoreError> {
    if actors.contains(user_id) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the supervisor or assigned analysts can upload to this rating".into(),
        ))
    }
}

/// Inclusive year range accepted for a rating.
pub const MIN_RATING_YEAR: i32 = 1990;
pub const MAX_RATING_YEAR: i32 = 2100;

pub fn validate_rating_year(year: i32) -> Result<(), CoreError> {
    if (MIN_RATING_YEAR..=MAX_RATING_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Rating year must be between {MIN_RATING_YEAR} and {MAX_RATING_YEAR}"
        )))
    }
}
