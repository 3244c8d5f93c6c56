//! The Mailer trait definition.

use async_trait::async_trait;

use crate::error::MailError;

/// Delivers one fully rendered message to one recipient.
///
/// Each call owns its own connection; nothing is shared between calls.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a multipart (HTML + plain text) message.
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError>;

    /// Deliver and collapse the outcome to a success flag.
    ///
    /// Never fails; errors are reported as `false`.
    async fn send(&self, recipient: &str, subject: &str, html: &str, text: &str) -> bool {
        self.deliver(recipient, subject, html, text).await.is_ok()
    }

    /// Get a human-readable name for this transport.
    fn name(&self) -> &str;
}
