use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, info, instrument, warn};

use crate::config::{Encryption, SmtpConfig};
use crate::message::OutgoingMessage;
use crate::session::{Connected, Session, Stream};
use crate::{MailError, Mailer};

/// SMTP client that opens one connection per message.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    config: SmtpConfig,
}

impl SmtpTransport {
    /// Create a new client with the given configuration.
    pub fn new(config: SmtpConfig) -> Self {
        info!(
            host = %config.host,
            port = config.port,
            encryption = %config.encryption,
            authenticated = config.username.is_some(),
            "Created SMTP transport"
        );
        Self { config }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// Deliver one message, reporting only success or failure.
    pub async fn send(&self, recipient: &str, subject: &str, html: &str, text: &str) -> bool {
        match self.try_send(recipient, subject, html, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!(recipient = %recipient, error = %e, "SMTP delivery failed");
                false
            }
        }
    }

    /// Deliver one message over a fresh connection.
    #[instrument(skip(self, subject, html, text), fields(host = %self.config.host, port = self.config.port))]
    pub async fn try_send(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError> {
        let config = &self.config;
        let message = OutgoingMessage::new(&config.sender, recipient, subject, html, text).render();

        let stream = self.connect().await?;
        let mut session = Session::<Connected>::new(stream, config.timeout)
            .read_greeting()
            .await?
            .ehlo(&config.helo_name)
            .await?;

        if config.encryption == Encryption::StartTls {
            session = session
                .starttls(&config.host, &self.tls_connector(), &config.helo_name)
                .await?;
        }

        let envelope = match config.credentials() {
            Some((username, password)) => {
                session
                    .auth_login(username, password)
                    .await?
                    .mail_from(&config.sender.address)
                    .await?
            }
            None => session.mail_from(&config.sender.address).await?,
        };

        let sent = envelope
            .rcpt_to(recipient)
            .await?
            .data()
            .await?
            .send_message(&message)
            .await?;
        sent.quit().await;

        info!(recipient = %recipient, "Email sent successfully");
        Ok(())
    }

    async fn connect(&self) -> Result<Box<dyn Stream>, MailError> {
        let host = self.config.host.as_str();
        let port = self.config.port;
        debug!("Connecting to SMTP server at {}:{}", host, port);

        let tcp = tokio::time::timeout(self.config.timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| MailError::Connection(format!("timed out connecting to {}:{}", host, port)))?
            .map_err(|e| MailError::Connection(format!("Failed to connect to {}:{}: {}", host, port, e)))?;

        match self.config.encryption {
            Encryption::Implicit => {
                let tls = self
                    .tls_connector()
                    .connect(host, tcp)
                    .await
                    .map_err(|e| MailError::Tls(format!("TLS handshake failed: {}", e)))?;
                Ok(Box::new(tls))
            }
            Encryption::StartTls | Encryption::None => Ok(Box::new(tcp)),
        }
    }

    fn tls_connector(&self) -> async_native_tls::TlsConnector {
        let connector = async_native_tls::TlsConnector::new();
        if self.config.accept_invalid_certs {
            connector
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
        } else {
            connector
        }
    }
}

#[async_trait]
impl Mailer for SmtpTransport {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        html: &str,
        text: &str,
    ) -> Result<(), MailError> {
        self.try_send(recipient, subject, html, text).await
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
