//! Email delivery via SMTP.
//!
//! [`SmtpEmailDelivery`] wraps the `lettre` async SMTP transport. Configuration
//! is loaded from environment variables; if `SMTP_HOST` is not set,
//! [`SmtpConfig::from_env`] returns `None` and no transport is constructed.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::message::EmailMessage;
use super::EmailError;

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@rms.local";

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl SmtpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default             |
    /// |-----------------|----------|---------------------|
    /// | `SMTP_HOST`     | yes      | -                   |
    /// | `SMTP_PORT`     | no       | `587`               |
    /// | `SMTP_FROM`     | no       | `noreply@rms.local` |
    /// | `SMTP_USER`     | no       | -                   |
    /// | `SMTP_PASSWORD` | no       | -                   |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SmtpEmailDelivery {
    config: SmtpConfig,
}

impl SmtpEmailDelivery {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Assemble the MIME message for `message`.
    pub fn build(&self, message: &EmailMessage) -> Result<Message, EmailError> {
        let to = Mailbox::new(Some(message.to.clone()), message.email.parse()?);
        let mut builder = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML);
        for cc in &message.cc {
            builder = builder.cc(cc.parse()?);
        }
        builder
            .body(message.html.clone())
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    pub async fn deliver(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let email = self.build(message)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        transport_builder.build().send(email).await?;

        tracing::info!(to = %message.email, subject = %message.subject, "Email sent via SMTP");
        Ok(())
    }
}
