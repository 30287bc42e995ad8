//! Request handlers.
//!
//! Entity submodules provide the same set of staff handlers (list, new_form,
//! get_by_id, edit_form, create, update, delete). Handlers delegate to the
//! repositories in `rms_db` and map errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod client;
pub mod common;
pub mod dashboard;
pub mod document;
pub mod industry;
pub mod methodology;
pub mod notices;
pub mod portal;
pub mod questionnaire;
pub mod rating;
pub mod rating_questionnaire;
pub mod settings;
pub mod user;
