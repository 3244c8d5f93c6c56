//! SMTP session as a typestate machine.
//!
//! Each transition consumes the session and either returns it in the next
//! state or fails with a [`MailError`]. Dropping a session closes the socket,
//! so a failed transition always ends the connection.

use std::marker::PhantomData;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, instrument};

use crate::message::prepare_data;
use crate::reply::{read_reply, Reply};
use crate::{MailError, SmtpStage};

/// Byte stream a session runs over: plain TCP or TLS.
pub trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Stream for T {}

mod sealed {
    pub trait Sealed {}
}

/// Marker for session states.
pub trait State: sealed::Sealed {}

/// States from which `MAIL FROM` may be issued.
pub trait ReadyForMail: State {}

macro_rules! states {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub struct $name;
            impl sealed::Sealed for $name {}
            impl State for $name {}
        )*
    };
}

states! {
    /// Socket open, greeting not yet read.
    Connected,
    /// Server greeted with 220.
    Greeted,
    /// EHLO accepted.
    Negotiated,
    /// AUTH LOGIN accepted.
    Authenticated,
    /// MAIL FROM accepted.
    EnvelopeFrom,
    /// RCPT TO accepted.
    EnvelopeTo,
    /// DATA accepted with 354.
    DataReady,
    /// Message accepted with 250.
    Sent,
}

impl ReadyForMail for Negotiated {}
impl ReadyForMail for Authenticated {}

/// One SMTP conversation over one connection.
pub struct Session<S: State> {
    conn: BufReader<Box<dyn Stream>>,
    timeout: Duration,
    extensions: Vec<String>,
    _state: PhantomData<S>,
}

impl<S: State> Session<S> {
    fn into_state<T: State>(self) -> Session<T> {
        Session {
            conn: self.conn,
            timeout: self.timeout,
            extensions: self.extensions,
            _state: PhantomData,
        }
    }

    async fn write_line(&mut self, line: &str) -> Result<(), MailError> {
        self.conn.write_all(line.as_bytes()).await?;
        self.conn.write_all(b"\r\n").await?;
        self.conn.flush().await?;
        Ok(())
    }

    async fn read(&mut self, stage: SmtpStage) -> Result<Reply, MailError> {
        let reply = read_reply(&mut self.conn, stage, self.timeout).await?;
        debug!(stage = %stage, code = reply.code, "SMTP reply");
        Ok(reply)
    }

    /// Send a command and require one of the `accepted` reply codes.
    async fn command(
        &mut self,
        line: &str,
        stage: SmtpStage,
        expected: &'static str,
        accepted: &[u16],
    ) -> Result<Reply, MailError> {
        self.write_line(line).await?;
        let reply = self.read(stage).await?;
        expect(reply, stage, expected, accepted)
    }

    /// Extension keywords advertised in the last EHLO reply, upper-cased.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether the server advertised an extension.
    pub fn supports(&self, keyword: &str) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.split_whitespace().next() == Some(keyword))
    }

    /// End the conversation. The reply is awaited but not required.
    pub async fn quit(mut self) {
        if self.write_line("QUIT").await.is_ok() {
            let _ = self.read(SmtpStage::Quit).await;
        }
        let _ = self.conn.get_mut().shutdown().await;
    }
}

fn expect(
    reply: Reply,
    stage: SmtpStage,
    expected: &'static str,
    accepted: &[u16],
) -> Result<Reply, MailError> {
    if reply.is_one_of(accepted) {
        Ok(reply)
    } else {
        Err(MailError::UnexpectedReply {
            stage,
            expected,
            reply: reply.to_string(),
        })
    }
}

impl Session<Connected> {
    /// Wrap a freshly opened stream.
    pub fn new(stream: Box<dyn Stream>, timeout: Duration) -> Self {
        Self {
            conn: BufReader::new(stream),
            timeout,
            extensions: Vec::new(),
            _state: PhantomData,
        }
    }

    /// Read the server greeting, which must be 220.
    pub async fn read_greeting(mut self) -> Result<Session<Greeted>, MailError> {
        let reply = self.read(SmtpStage::Greeting).await?;
        expect(reply, SmtpStage::Greeting, "220", &[220])?;
        Ok(self.into_state())
    }
}

impl Session<Greeted> {
    /// Send EHLO and record the advertised extensions.
    pub async fn ehlo(mut self, helo_name: &str) -> Result<Session<Negotiated>, MailError> {
        let reply = self
            .command(&format!("EHLO {}", helo_name), SmtpStage::Ehlo, "250", &[250])
            .await?;

        // The first line is the server's identity, the rest are extensions.
        self.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| line.trim().to_ascii_uppercase())
            .collect();

        Ok(self.into_state())
    }
}

impl Session<Negotiated> {
    /// Upgrade the connection with STARTTLS and repeat EHLO over TLS.
    #[instrument(skip(self, connector, helo_name))]
    pub async fn starttls(
        mut self,
        host: &str,
        connector: &async_native_tls::TlsConnector,
        helo_name: &str,
    ) -> Result<Session<Negotiated>, MailError> {
        self.command("STARTTLS", SmtpStage::StartTls, "220", &[220])
            .await?;

        let timeout = self.timeout;
        let stream = self.conn.into_inner();
        let tls = connector
            .connect(host, stream)
            .await
            .map_err(|e| MailError::Tls(format!("TLS upgrade failed: {}", e)))?;

        debug!("Connection upgraded to TLS");

        // No greeting follows STARTTLS; the session restarts at EHLO.
        let session: Session<Greeted> = Session::<Connected>::new(Box::new(tls), timeout).into_state();
        session.ehlo(helo_name).await
    }

    /// Authenticate with AUTH LOGIN.
    ///
    /// A permanent failure at any step is reported as [`MailError::Auth`].
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Session<Authenticated>, MailError> {
        self.auth_step("AUTH LOGIN", SmtpStage::AuthLogin, 334).await?;
        self.auth_step(&STANDARD.encode(username), SmtpStage::AuthUsername, 334)
            .await?;
        self.auth_step(&STANDARD.encode(password), SmtpStage::AuthPassword, 235)
            .await?;
        Ok(self.into_state())
    }

    async fn auth_step(&mut self, line: &str, stage: SmtpStage, code: u16) -> Result<(), MailError> {
        self.write_line(line).await?;
        let reply = self.read(stage).await?;
        if reply.code == code {
            return Ok(());
        }
        if reply.is_permanent_failure() {
            return Err(MailError::Auth(reply.to_string()));
        }
        Err(MailError::UnexpectedReply {
            stage,
            expected: if code == 235 { "235" } else { "334" },
            reply: reply.to_string(),
        })
    }
}

impl<S: ReadyForMail> Session<S> {
    /// Open the envelope with `MAIL FROM`.
    pub async fn mail_from(mut self, address: &str) -> Result<Session<EnvelopeFrom>, MailError> {
        self.command(
            &format!("MAIL FROM:<{}>", address),
            SmtpStage::MailFrom,
            "250",
            &[250],
        )
        .await?;
        Ok(self.into_state())
    }
}

impl Session<EnvelopeFrom> {
    /// Add the single recipient. 251 (will forward) is accepted.
    pub async fn rcpt_to(mut self, address: &str) -> Result<Session<EnvelopeTo>, MailError> {
        self.command(
            &format!("RCPT TO:<{}>", address),
            SmtpStage::RcptTo,
            "250 or 251",
            &[250, 251],
        )
        .await?;
        Ok(self.into_state())
    }
}

impl Session<EnvelopeTo> {
    /// Ask to start the message body.
    pub async fn data(mut self) -> Result<Session<DataReady>, MailError> {
        self.command("DATA", SmtpStage::Data, "354", &[354]).await?;
        Ok(self.into_state())
    }
}

impl Session<DataReady> {
    /// Transmit the message and the `.` terminator; the server must answer 250.
    pub async fn send_message(mut self, message: &str) -> Result<Session<Sent>, MailError> {
        let body = prepare_data(message);
        self.conn.write_all(body.as_bytes()).await?;
        self.conn.write_all(b".\r\n").await?;
        self.conn.flush().await?;

        let reply = self.read(SmtpStage::Message).await?;
        expect(reply, SmtpStage::Message, "250", &[250])?;
        Ok(self.into_state())
    }
}
