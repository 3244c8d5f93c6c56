//! Error types shared at the collaborator seams.

use std::fmt;

use thiserror::Error;

/// Errors that can occur while generating narrative text.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The analyzer is temporarily unavailable.
    #[error("analyzer unavailable: {0}")]
    Unavailable(String),

    /// Configuration error (missing API key, bad URL, etc.)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network error talking to a remote service.
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be processed.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// A timeout occurred during processing.
    #[error("analysis timed out")]
    Timeout,
}

/// Errors raised by storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be read or written.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
}

/// Protocol stage at which an SMTP exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpStage {
    Greeting,
    Ehlo,
    StartTls,
    AuthLogin,
    AuthUsername,
    AuthPassword,
    MailFrom,
    RcptTo,
    Data,
    Message,
    Quit,
}

impl fmt::Display for SmtpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SmtpStage::Greeting => "greeting",
            SmtpStage::Ehlo => "EHLO",
            SmtpStage::StartTls => "STARTTLS",
            SmtpStage::AuthLogin => "AUTH LOGIN",
            SmtpStage::AuthUsername => "AUTH username",
            SmtpStage::AuthPassword => "AUTH password",
            SmtpStage::MailFrom => "MAIL FROM",
            SmtpStage::RcptTo => "RCPT TO",
            SmtpStage::Data => "DATA",
            SmtpStage::Message => "message body",
            SmtpStage::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while delivering one message.
#[derive(Debug, Error)]
pub enum MailError {
    /// Socket could not be opened.
    #[error("connection failed: {0}")]
    Connection(String),

    /// TLS negotiation failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server did not answer in time.
    #[error("timed out waiting for server during {0}")]
    Timeout(SmtpStage),

    /// The server answered with an unexpected reply code.
    #[error("unexpected reply during {stage}: expected {expected}, got {reply:?}")]
    UnexpectedReply {
        stage: SmtpStage,
        expected: &'static str,
        reply: String,
    },

    /// The server rejected the credentials.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// The reply could not be parsed.
    #[error("malformed reply during {stage}: {line:?}")]
    MalformedReply { stage: SmtpStage, line: String },

    /// IO error on the socket or pipe.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid transport configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local submission program failed.
    #[error("local submission failed: {0}")]
    Submission(String),
}
