use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::MailError;

/// How the SMTP connection is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encryption {
    /// Plain connection upgraded with STARTTLS after the first EHLO.
    #[default]
    StartTls,
    /// TLS from the first byte (SMTPS).
    Implicit,
    /// No encryption.
    None,
}

impl FromStr for Encryption {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tls" | "starttls" => Ok(Encryption::StartTls),
            "ssl" | "smtps" => Ok(Encryption::Implicit),
            "none" | "" => Ok(Encryption::None),
            other => Err(MailError::Config(format!(
                "Invalid SMTP_ENCRYPTION '{}': expected tls, ssl or none",
                other
            ))),
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encryption::StartTls => "tls",
            Encryption::Implicit => "ssl",
            Encryption::None => "none",
        })
    }
}

/// The `From` identity put on every message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Envelope and header address
    pub address: String,
    /// Optional display name
    pub name: Option<String>,
}

impl Sender {
    pub fn new(address: impl Into<String>, name: Option<String>) -> Self {
        Self {
            address: address.into(),
            name: name.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Read the sender from the environment.
    ///
    /// - `SMTP_FROM_ADDRESS` - Default: `SMTP_USER`, else `brief@localhost`
    /// - `SMTP_FROM_NAME` - Default: Federal Contracting Brief
    pub fn from_env() -> Self {
        let address = env::var("SMTP_FROM_ADDRESS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env::var("SMTP_USER").ok().filter(|v| v.contains('@')))
            .unwrap_or_else(|| "brief@localhost".to_string());

        let name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Federal Contracting Brief".to_string());

        Self::new(address, Some(name))
    }
}

impl Default for Sender {
    fn default() -> Self {
        Self::new("brief@localhost", Some("Federal Contracting Brief".to_string()))
    }
}

/// Configuration for the SMTP client.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP host
    pub host: String,
    /// SMTP port (default: 587)
    pub port: u16,
    /// Connection protection (default: STARTTLS)
    pub encryption: Encryption,
    /// Login name; AUTH is skipped when absent
    pub username: Option<String>,
    password: Option<SecretString>,
    /// Per-read timeout (default: 30s)
    pub timeout: Duration,
    /// Name announced in EHLO (default: localhost)
    pub helo_name: String,
    /// Accept self-signed certificates (local relays and bridges)
    pub accept_invalid_certs: bool,
    /// Message sender
    pub sender: Sender,
}

impl SmtpConfig {
    /// Default submission port.
    pub const DEFAULT_PORT: u16 = 587;
    /// Default per-read timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration for a host with defaults for everything else.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            encryption: Encryption::default(),
            username: None,
            password: None,
            timeout: Self::DEFAULT_TIMEOUT,
            helo_name: "localhost".to_string(),
            accept_invalid_certs: false,
            sender: Sender::default(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required:
    /// - `SMTP_HOST`
    ///
    /// Optional (with defaults):
    /// - `SMTP_PORT` - Default: 587
    /// - `SMTP_USER` / `SMTP_PASS` - Default: no authentication
    /// - `SMTP_ENCRYPTION` - `tls` (default), `ssl` or `none`
    /// - `SMTP_TIMEOUT_SECS` - Default: 30
    /// - `SMTP_HELO_NAME` - Default: localhost
    /// - `SMTP_ACCEPT_INVALID_CERTS` - Default: false
    pub fn from_env() -> Result<Self, MailError> {
        let host = env::var("SMTP_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| MailError::Config("SMTP_HOST is not set".to_string()))?;

        let port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| MailError::Config(format!("Invalid SMTP_PORT: {}", e)))?;

        let encryption = env::var("SMTP_ENCRYPTION")
            .unwrap_or_else(|_| "tls".to_string())
            .parse::<Encryption>()?;

        let timeout_secs = env::var("SMTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|e| MailError::Config(format!("Invalid SMTP_TIMEOUT_SECS: {}", e)))?;

        let helo_name = env::var("SMTP_HELO_NAME").unwrap_or_else(|_| "localhost".to_string());

        let accept_invalid_certs = env::var("SMTP_ACCEPT_INVALID_CERTS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let mut config = Self::new(host.trim(), port)
            .with_encryption(encryption)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_helo_name(helo_name)
            .with_accept_invalid_certs(accept_invalid_certs)
            .with_sender(Sender::from_env());

        if let (Ok(user), Ok(pass)) = (env::var("SMTP_USER"), env::var("SMTP_PASS")) {
            if !user.is_empty() {
                config = config.with_credentials(user, pass);
            }
        }

        Ok(config)
    }

    /// Username and password, when both are configured.
    pub(crate) fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.expose_secret())),
            _ => None,
        }
    }

    /// Builder method to set login credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Builder method to set the encryption mode.
    pub fn with_encryption(mut self, encryption: Encryption) -> Self {
        self.encryption = encryption;
        self
    }

    /// Builder method to set the per-read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the EHLO name.
    pub fn with_helo_name(mut self, name: impl Into<String>) -> Self {
        self.helo_name = name.into();
        self
    }

    /// Builder method to accept invalid certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builder method to set the sender.
    pub fn with_sender(mut self, sender: Sender) -> Self {
        self.sender = sender;
        self
    }
}
