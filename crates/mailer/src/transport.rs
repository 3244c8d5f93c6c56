use async_trait::async_trait;
use tracing::info;

use crate::config::SmtpConfig;
use crate::sendmail::SendmailTransport;
use crate::smtp::SmtpTransport;
use crate::{MailError, Mailer};

/// The configured delivery path: SMTP when a host is set, local sendmail otherwise.
#[derive(Debug, Clone)]
pub enum MailTransport {
    Smtp(SmtpTransport),
    Sendmail(SendmailTransport),
}

impl MailTransport {
    /// Select the transport from the environment.
    ///
    /// A non-empty `SMTP_HOST` selects SMTP (see [`SmtpConfig::from_env`]);
    /// otherwise messages go through `SENDMAIL_PATH`.
    pub fn from_env() -> Result<Self, MailError> {
        let has_host = std::env::var("SMTP_HOST")
            .map(|h| !h.trim().is_empty())
            .unwrap_or(false);

        if has_host {
            Ok(MailTransport::Smtp(SmtpTransport::new(SmtpConfig::from_env()?)))
        } else {
            info!("SMTP_HOST not set, falling back to local sendmail");
            Ok(MailTransport::Sendmail(SendmailTransport::from_env()))
        }
    }
}

#[async_trait]
impl Mailer for MailTransport {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError> {
        match self {
            MailTransport::Smtp(smtp) => smtp.try_send(recipient, subject, html, text).await,
            MailTransport::Sendmail(sendmail) => sendmail.deliver(recipient, subject, html, text).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            MailTransport::Smtp(smtp) => smtp.name(),
            MailTransport::Sendmail(sendmail) => sendmail.name(),
        }
    }
}
