//! Domain logic of the rating management system.
//!
//! Everything here is I/O free: field schemas and the introspector, the form,
//! table and questionnaire view models, list pagination and the per-session
//! list cache, notices, cookie crypto, storage keys and rating rules. The
//! database, storage, email and HTTP layers build on these types.

pub mod crypto;
pub mod error;
pub mod fields;
pub mod form;
pub mod list_cache;
pub mod notice;
pub mod pagination;
pub mod questionnaire;
pub mod rating;
pub mod roles;
pub mod schemas;
pub mod storage_key;
pub mod table;
pub mod types;
