//! HTML bodies of notification emails.

use crate::message::EmailMessage;

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Details of an uploaded rating document, for the notification body.
#[derive(Debug, Clone)]
pub struct DocumentNotice<'a> {
    pub company_name: &'a str,
    pub rating_year: i32,
    /// `invoice`, `receipt` or `document`.
    pub kind: &'a str,
    pub file_name: &'a str,
    pub url: &'a str,
}

/// Build one "document uploaded" message per recipient address.
pub fn document_uploaded(notice: &DocumentNotice<'_>, recipients: &[String]) -> Vec<EmailMessage> {
    let subject = format!(
        "New {} for your {} rating",
        notice.kind, notice.rating_year
    );
    let html = format!(
        "<p>Dear {company},</p>\
         <p>A new {kind} has been added to your {year} rating: \
         <a href=\"{url}\">{file}</a>.</p>\
         <p>You can review it in the client portal.</p>",
        company = escape_html(notice.company_name),
        kind = escape_html(notice.kind),
        year = notice.rating_year,
        url = escape_html(notice.url),
        file = escape_html(notice.file_name),
    );

    recipients
        .iter()
        .map(|email| EmailMessage::new(notice.company_name, email.clone(), subject.clone(), html.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn one_message_per_recipient() {
        let notice = DocumentNotice {
            company_name: "Acme <Holdings>",
            rating_year: 2025,
            kind: "invoice",
            file_name: "inv.pdf",
            url: "https://files.example/7/inv.pdf",
        };
        let messages =
            document_uploaded(&notice, &["a@acme.io".to_string(), "b@acme.io".to_string()]);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].email, "b@acme.io");
        assert_eq!(messages[0].subject, "New invoice for your 2025 rating");
        assert!(messages[0].html.contains("Acme &lt;Holdings&gt;"));
    }
}
