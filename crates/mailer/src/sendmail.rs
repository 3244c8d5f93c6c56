use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, instrument, warn};

use crate::config::Sender;
use crate::message::OutgoingMessage;
use crate::{MailError, Mailer};

/// Hands messages to the local mail submission program (`sendmail -t -i`).
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    program: PathBuf,
    sender: Sender,
    timeout: Duration,
}

impl SendmailTransport {
    /// Default location of the submission program.
    pub const DEFAULT_PROGRAM: &'static str = "/usr/sbin/sendmail";
    /// How long one submission may take before the program is killed.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(program: impl Into<PathBuf>, sender: Sender) -> Self {
        Self {
            program: program.into(),
            sender,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Create from `SENDMAIL_PATH` (default `/usr/sbin/sendmail`) and the sender variables.
    pub fn from_env() -> Self {
        let program =
            std::env::var("SENDMAIL_PATH").unwrap_or_else(|_| Self::DEFAULT_PROGRAM.to_string());
        Self::new(program, Sender::from_env())
    }

    /// Builder method to set the submission timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Submit one message.
    #[instrument(skip(self, subject, html, text), fields(program = %self.program.display()))]
    pub async fn try_send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError> {
        let message = OutgoingMessage::new(&self.sender, recipient, subject, html, text).render();

        let mut child = Command::new(&self.program)
            .arg("-t")
            .arg("-i")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MailError::Submission(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits early is judged by its exit status below.
            match stdin.write_all(message.as_bytes()).await {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                MailError::Submission(format!(
                    "{} timed out after {:?}",
                    self.program.display(),
                    self.timeout
                ))
            })??;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MailError::Submission(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        info!(recipient = %recipient, "Message handed to sendmail");
        Ok(())
    }
}

#[async_trait]
impl Mailer for SendmailTransport {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError> {
        self.try_send(recipient, subject, html, text)
            .await
            .inspect_err(|e| warn!(recipient = %recipient, error = %e, "sendmail delivery failed"))
    }

    fn name(&self) -> &str {
        "sendmail"
    }
}
