//! Email dispatch with API-first, SMTP-fallback routing.

use crate::delivery::http::{HttpEmailConfig, HttpEmailDelivery};
use crate::delivery::smtp::{SmtpConfig, SmtpEmailDelivery};
use crate::delivery::EmailError;
use crate::message::EmailMessage;

#[derive(Debug, Clone, Default)]
pub struct Mailer {
    http: Option<HttpEmailDelivery>,
    smtp: Option<SmtpEmailDelivery>,
}

impl Mailer {
    pub fn new(http: Option<HttpEmailDelivery>, smtp: Option<SmtpEmailDelivery>) -> Self {
        Self { http, smtp }
    }

    /// Build whichever transports are configured in the environment.
    pub fn from_env() -> Self {
        let mailer = Self::new(
            HttpEmailConfig::from_env().map(HttpEmailDelivery::new),
            SmtpConfig::from_env().map(SmtpEmailDelivery::new),
        );
        if !mailer.is_configured() {
            tracing::warn!("No email transport configured; notifications will not be sent");
        }
        mailer
    }

    pub fn is_configured(&self) -> bool {
        self.http.is_some() || self.smtp.is_some()
    }

    /// Send through the email API; on failure, or when only SMTP is
    /// configured, send through SMTP.
    pub async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if let Some(http) = &self.http {
            match http.deliver(message).await {
                Ok(()) => return Ok(()),
                Err(e) if self.smtp.is_some() => {
                    tracing::warn!(to = %message.email, error = %e, "Email API failed, falling back to SMTP");
                }
                Err(e) => return Err(e),
            }
        }
        match &self.smtp {
            Some(smtp) => smtp.deliver(message).await,
            None => Err(EmailError::NotConfigured),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_mailer_refuses() {
        let mailer = Mailer::default();
        assert!(!mailer.is_configured());
        let message = EmailMessage::new("Acme", "ops@acme.io", "Hi", "<p>Hi</p>");
        assert!(matches!(
            mailer.send(&message).await,
            Err(EmailError::NotConfigured)
        ));
    }
}
