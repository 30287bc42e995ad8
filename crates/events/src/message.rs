use serde::{Deserialize, Serialize};

/// One outbound email, serialized as posted to the email API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient display name.
    pub to: String,
    /// Recipient address.
    pub email: String,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        email: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            email: email.into(),
            subject: subject.into(),
            html: html.into(),
            cc: Vec::new(),
        }
    }

    pub fn with_cc(mut self, cc: impl IntoIterator<Item = String>) -> Self {
        self.cc.extend(cc);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cc_is_omitted_when_empty() {
        let message = EmailMessage::new("Acme", "ops@acme.io", "Hi", "<p>Hi</p>");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "to": "Acme",
                "email": "ops@acme.io",
                "subject": "Hi",
                "html": "<p>Hi</p>",
            })
        );

        let json = serde_json::to_value(message.with_cc(["cfo@acme.io".to_string()])).unwrap();
        assert_eq!(json["cc"], serde_json::json!(["cfo@acme.io"]));
    }
}
