//! Outbound email for the rating management system.
//!
//! - [`EmailMessage`] is the wire shape `{to, email, subject, html, cc?}`.
//! - [`delivery`] holds the two transports: the transactional HTTP API and
//!   the legacy SMTP path.
//! - [`Mailer`] tries the API first and falls back to SMTP.
//! - [`send_batch`] fans a set of messages out concurrently and reports each
//!   failure without aborting the others.
//! - [`templates`] renders the notification bodies.

pub mod batch;
pub mod delivery;
pub mod mailer;
pub mod message;
pub mod templates;

pub use batch::{send_batch, BatchReport, FailedSend};
pub use delivery::http::{HttpEmailConfig, HttpEmailDelivery};
pub use delivery::smtp::{SmtpConfig, SmtpEmailDelivery};
pub use delivery::EmailError;
pub use mailer::Mailer;
pub use message::EmailMessage;
