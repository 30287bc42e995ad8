//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. List queries take a
//! normalized [`rms_core::pagination::ListQuery`] and come in
//! `search`/`count` pairs so the caller can build page metadata.

pub mod client_login_repo;
pub mod client_repo;
pub mod dashboard_repo;
pub mod industry_repo;
pub mod methodology_repo;
pub mod questionnaire_repo;
pub mod rating_document_repo;
pub mod rating_repo;
pub mod user_repo;

pub use client_login_repo::ClientLoginRepo;
pub use client_repo::ClientRepo;
pub use dashboard_repo::DashboardRepo;
pub use industry_repo::IndustryRepo;
pub use methodology_repo::MethodologyRepo;
pub use questionnaire_repo::QuestionnaireRepo;
pub use rating_document_repo::RatingDocumentRepo;
pub use rating_repo::{RatingRepo, RespondOutcome};
pub use user_repo::UserRepo;
