//! Email transports.
//!
//! [`http`] posts messages to the transactional email API; [`smtp`] is the
//! legacy direct-SMTP path used as fallback.

pub mod http;
pub mod smtp;

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Neither the email API nor SMTP is configured.
    #[error("Email delivery is not configured")]
    NotConfigured,

    /// The HTTP request to the email API failed (network, DNS, timeout, etc.).
    #[error("Email API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The email API returned a non-2xx status code.
    #[error("Email API returned HTTP {0}")]
    HttpStatus(u16),

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}
