//! Transactional email API delivery.
//!
//! [`HttpEmailDelivery`] posts the JSON-encoded [`EmailMessage`] to the
//! configured endpoint with the API key in an `x-api-key` header. There is no
//! retry: a failed send is reported to the caller, which logs it.

use std::time::Duration;

use crate::message::EmailMessage;
use super::EmailError;

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct HttpEmailConfig {
    pub api_url: String,
    pub api_key: String,
}

impl HttpEmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless both `EMAIL_API_URL` and `EMAIL_API_KEY` are set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: std::env::var("EMAIL_API_URL").ok().filter(|v| !v.is_empty())?,
            api_key: std::env::var("EMAIL_API_KEY").ok().filter(|v| !v.is_empty())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpEmailDelivery {
    client: reqwest::Client,
    config: HttpEmailConfig,
}

impl HttpEmailDelivery {
    pub fn new(config: HttpEmailConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    pub async fn deliver(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmailError::HttpStatus(status.as_u16()));
        }

        tracing::info!(to = %message.email, subject = %message.subject, "Email sent via API");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_error_display() {
        assert_eq!(
            EmailError::HttpStatus(503).to_string(),
            "Email API returned HTTP 503"
        );
    }
}
