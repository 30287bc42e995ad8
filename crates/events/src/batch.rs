//! Concurrent fan-out of notification emails.
//!
//! Every send in a batch is dispatched at once and awaited together. Each
//! failure is caught and logged on its own; no send is retried, and a failure
//! never aborts the remaining sends.

use std::future::Future;

use futures::future::join_all;
use serde::Serialize;

use crate::delivery::EmailError;
use crate::message::EmailMessage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSend {
    /// Recipient address.
    pub to: String,
    pub error: String,
}

/// Outcome of a batch. `failed` lists each send that did not go through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub sent: usize,
    pub failed: Vec<FailedSend>,
}

impl BatchReport {
    pub fn all_sent(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Dispatch `messages` concurrently through `send` and collect the outcome.
pub async fn send_batch<F, Fut>(messages: Vec<EmailMessage>, send: F) -> BatchReport
where
    F: Fn(EmailMessage) -> Fut,
    Fut: Future<Output = Result<(), EmailError>>,
{
    let recipients: Vec<String> = messages.iter().map(|m| m.email.clone()).collect();
    let outcomes = join_all(messages.into_iter().map(send)).await;

    let mut report = BatchReport::default();
    for (to, outcome) in recipients.into_iter().zip(outcomes) {
        match outcome {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::error!(to = %to, error = %e, "Notification email failed");
                report.failed.push(FailedSend {
                    to,
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn message(email: &str) -> EmailMessage {
        EmailMessage::new("Acme", email, "Document uploaded", "<p>New file</p>")
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_others() {
        let attempts = AtomicUsize::new(0);
        let report = send_batch(
            vec![message("a@acme.io"), message("b@acme.io"), message("c@acme.io")],
            |m| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if m.email == "b@acme.io" {
                        Err(EmailError::HttpStatus(500))
                    } else {
                        Ok(())
                    }
                }
            },
        )
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(report.sent, 2);
        assert_eq!(
            report.failed,
            vec![FailedSend {
                to: "b@acme.io".to_string(),
                error: "Email API returned HTTP 500".to_string(),
            }]
        );
        assert!(!report.all_sent());
    }

    #[tokio::test]
    async fn empty_batch_is_a_clean_report() {
        let report = send_batch(Vec::new(), |_| async { Ok(()) }).await;
        assert_eq!(report, BatchReport::default());
        assert!(report.all_sent());
    }
}
